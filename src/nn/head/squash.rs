/*
 * @Author       : 老董
 * @Date         : 2026-10-12
 * @Description  : 特征挤压：把骨干网络输出统一成[N, C, T, H, W]，可选全局平均池化
 */

use crate::nn::HeadError;
use crate::nn::layer::GlobalAvgPool3d;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy)]
pub struct FeatureSquasher {
    pool: Option<GlobalAvgPool3d>,
}

impl FeatureSquasher {
    pub const fn new(spatial_pooling: bool) -> Self {
        Self {
            pool: if spatial_pooling {
                Some(GlobalAvgPool3d::new())
            } else {
                None
            },
        }
    }

    pub const fn is_pooling(&self) -> bool {
        self.pool.is_some()
    }

    /// # 参数
    /// - `x`: [N, C, H, W] 或 [N, C, T, H, W]；4阶输入在第2维补一个长度为1的时间轴
    ///
    /// # 返回
    /// 5阶张量；池化时为 [N, C, 1, 1, 1]
    pub fn forward(&self, x: &Tensor) -> Result<Tensor, HeadError> {
        let x = match x.dimension() {
            4 => x.unsqueeze(2),
            5 => x.clone(),
            got => {
                return Err(HeadError::DimensionMismatch {
                    expected: 5,
                    got,
                    message: "特征须为[N, C, H, W]或[N, C, T, H, W]".to_string(),
                });
            }
        };
        match &self.pool {
            Some(pool) => pool.forward(&x),
            None => Ok(x),
        }
    }
}

/// 把 [N, C, T, H, W] 展平为 [N, C]，要求时空维度已被挤压为1
pub fn flatten(x: &Tensor, channels: usize) -> Result<Tensor, HeadError> {
    let batch_size = x.shape().first().copied().unwrap_or(0);
    let extent = x.shape().iter().skip(2).product::<usize>();
    if x.dimension() < 2 || x.shape()[1] != channels || extent != 1 {
        return Err(HeadError::shape_mismatch(
            &[batch_size, channels, 1, 1, 1],
            x.shape(),
            "展平前时空维度须为1且通道数须与配置一致",
        ));
    }
    Ok(x.reshape(&[batch_size, channels]))
}
