/*
 * @Author       : 老董
 * @Date         : 2026-10-10
 * @Description  : 全局三维平均池化，即输出尺寸为(1, 1, 1)的自适应平均池化
 *
 * - 输入格式：[batch_size, channels, T, H, W]
 * - 输出格式：[batch_size, channels, 1, 1, 1]
 */

use crate::nn::HeadError;
use crate::tensor::Tensor;

/// 池化层没有可学习参数
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAvgPool3d;

impl GlobalAvgPool3d {
    pub const fn new() -> Self {
        Self
    }

    pub fn forward(&self, x: &Tensor) -> Result<Tensor, HeadError> {
        if x.dimension() != 5 {
            return Err(HeadError::DimensionMismatch {
                expected: 5,
                got: x.dimension(),
                message: "三维池化的输入须为[N, C, T, H, W]".to_string(),
            });
        }
        let (n, c) = (x.shape()[0], x.shape()[1]);
        let extent = x.shape()[2..].iter().product::<usize>();
        if extent == 0 {
            return Err(HeadError::shape_mismatch(
                &[n, c, 1, 1, 1],
                x.shape(),
                "时空维度为空，无法池化",
            ));
        }
        Ok(x.reshape(&[n, c, extent])
            .mean_axis(2, false)
            .reshape(&[n, c, 1, 1, 1]))
    }
}
