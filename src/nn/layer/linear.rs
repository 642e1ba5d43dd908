/*
 * @Author       : 老董
 * @Date         : 2026-10-10
 * @Description  : Linear (全连接) 层，无嵌入模式下的普通打分器
 */

use crate::nn::{HeadError, Init, Module};
use crate::tensor::Tensor;
use rand::Rng;

/// Linear (全连接) 层
///
/// PyTorch 风格的全连接层：`output = x @ W + b`
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, out_features]
///
/// # 使用示例
/// ```ignore
/// let fc = Linear::new(2048, 400, true, Init::Normal { mean: 0., std: 0.01 }, &mut rng);
/// let scores = fc.forward(&x)?;
/// ```
#[derive(Debug, Clone)]
pub struct Linear {
    /// 权重参数 [in_features, out_features]
    weights: Tensor,
    /// 偏置参数 [1, out_features]（可选）
    bias: Option<Tensor>,
    /// 输入特征维度
    in_features: usize,
    /// 输出特征维度
    out_features: usize,
}

impl Linear {
    /// 创建新的 Linear 层
    ///
    /// # 参数
    /// - `in_features`: 输入特征维度
    /// - `out_features`: 输出特征维度
    /// - `use_bias`: 是否使用偏置（偏置一律零初始化）
    /// - `init`: 权重初始化策略
    /// - `rng`: 初始化所用的随机数源
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        use_bias: bool,
        init: Init,
        rng: &mut R,
    ) -> Self {
        let weights = init.generate_with_rng(&[in_features, out_features], rng);
        let bias = use_bias.then(|| Tensor::zeros(&[1, out_features]));
        Self {
            weights,
            bias,
            in_features,
            out_features,
        }
    }

    /// 前向传播，计算 `x @ W + b`
    ///
    /// # 参数
    /// - `x`: 输入，形状 [batch_size, in_features]
    ///
    /// # 返回
    /// 输出，形状 [batch_size, out_features]
    pub fn forward(&self, x: &Tensor) -> Result<Tensor, HeadError> {
        if x.dimension() != 2 || x.shape()[1] != self.in_features {
            return Err(HeadError::shape_mismatch(
                &[x.shape().first().copied().unwrap_or(0), self.in_features],
                x.shape(),
                "Linear 层输入形状不符",
            ));
        }
        let xw = x.mat_mul(&self.weights);
        Ok(match &self.bias {
            Some(bias) => &xw + bias,
            None => xw,
        })
    }

    /// 获取输入特征维度
    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    /// 获取输出特征维度
    pub const fn out_features(&self) -> usize {
        self.out_features
    }

    /// 获取权重
    pub const fn weights(&self) -> &Tensor {
        &self.weights
    }

    /// 获取偏置（如果有）
    pub const fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// 替换权重（外部优化器在两次前向之间调用）
    ///
    /// # Panics
    /// 新权重形状与原权重不一致时
    pub fn set_weights(&mut self, weights: Tensor) {
        assert_eq!(weights.shape(), self.weights.shape(), "Linear 权重形状不可改变");
        self.weights = weights;
    }
}

impl Module for Linear {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params = vec![("weight".to_string(), &self.weights)];
        if let Some(ref bias) = self.bias {
            params.push(("bias".to_string(), bias));
        }
        params
    }
}
