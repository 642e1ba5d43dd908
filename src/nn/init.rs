/*
 * @Author       : 老董
 * @Date         : 2026-10-09
 * @Description  : 参数初始化策略（构造时一次性执行，前向时不再触碰）
 */

use crate::tensor::Tensor;
use rand::Rng;

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`），`std = sqrt(2 / shape[0])`。
    /// 卷积权重按 `[out, in]` 存放，此时即为 fan_out 模式
    Kaiming,
    /// 每一列单独归一化为单位长度的标准正态分布（用于类中心）
    UnitColumns,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let fan = shape.first().copied().unwrap_or(1).max(1);
                let std = (2.0 / fan as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::UnitColumns => {
                let raw = Tensor::normal_with_rng(0.0, 1.0, shape, rng);
                if raw.dimension() == 2 {
                    crate::nn::sphere::normalize(&raw, 0)
                } else {
                    raw
                }
            }
        }
    }
}
