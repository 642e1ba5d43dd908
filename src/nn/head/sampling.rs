/*
 * @Author       : 老董
 * @Date         : 2026-10-13
 * @Description  : 测地线采样：把每个嵌入沿球面上的随机切向方向旋转一个随机角度
 *
 * 1. 随机方向 d 投影到嵌入所在点的切平面并归一化，得到 t̂
 * 2. 旋转角 θ = min(|std · z|, π/2)，z ~ N(0, 1)
 * 3. e' = cos θ · e + sin θ · t̂
 * 角度标准差可以全局统一，也可以按类别样本数自适应：std_c = base · count_c^(-1/4)。
 */

use crate::nn::error::check_labels;
use crate::nn::{Context, HeadError, sphere};
use crate::tensor::Tensor;
use num_traits::{Float, FloatConst};
use std::collections::BTreeMap;
use tracing::debug;

/// 旋转角标准差
#[derive(Debug, Clone, PartialEq)]
pub enum AngularStd {
    /// 所有样本共用
    Global(f32),
    /// 按类别取值 [num_classes]
    PerClass(Tensor),
}

impl AngularStd {
    /// 由各类别样本数推出按类别的标准差，未出现的类别按1个样本计
    pub fn per_class(
        base_std: f32,
        num_classes: usize,
        class_sizes: &BTreeMap<usize, usize>,
    ) -> Result<Self, HeadError> {
        check_base_std(base_std)?;
        let mut stds = Vec::with_capacity(num_classes);
        for class_id in 0..num_classes {
            let count = class_sizes.get(&class_id).copied().unwrap_or(1);
            if count == 0 {
                return Err(HeadError::invalid_config(format!(
                    "类别{class_id}的样本数须为正"
                )));
            }
            stds.push(base_std * (count as f32).powf(-0.25));
        }
        Ok(Self::PerClass(Tensor::new(&stds, &[num_classes])))
    }

    pub const fn is_adaptive(&self) -> bool {
        matches!(self, Self::PerClass(_))
    }

    /// 每个样本所用的标准差 [N, 1]
    pub fn for_batch(&self, labels: Option<&[usize]>, batch_size: usize) -> Result<Tensor, HeadError> {
        match self {
            Self::Global(std) => Ok(Tensor::full(*std, &[batch_size, 1])),
            Self::PerClass(stds) => {
                let labels = labels.ok_or_else(|| {
                    HeadError::MissingLabels("自适应采样需要标签来查找各类别的角度标准差".to_string())
                })?;
                let stds = stds.to_vec();
                check_labels(labels, batch_size, stds.len())?;
                let per_sample = labels.iter().map(|&label| stds[label]).collect::<Vec<_>>();
                Ok(Tensor::new(&per_sample, &[batch_size, 1]))
            }
        }
    }
}

fn check_base_std(base_std: f32) -> Result<(), HeadError> {
    if base_std > 0. && base_std < f32::FRAC_PI_2() {
        Ok(())
    } else {
        Err(HeadError::invalid_config(format!(
            "采样角度标准差须在(0, π/2)内，实际为{base_std}"
        )))
    }
}

/// 切向量模长低于此值时视为退化
const MIN_TANGENT_NORM: f32 = 1e-6;

/// 旋转角取绝对值并截断到π/2
fn rotation_angle<T: Float + FloatConst>(scaled_noise: T) -> T {
    scaled_noise.abs().min(T::FRAC_PI_2())
}

#[derive(Debug, Clone)]
pub struct GeodesicSampler {
    angle_std: AngularStd,
}

impl GeodesicSampler {
    pub fn new(base_std: f32) -> Result<Self, HeadError> {
        check_base_std(base_std)?;
        Ok(Self {
            angle_std: AngularStd::Global(base_std),
        })
    }

    pub fn adaptive(
        base_std: f32,
        num_classes: usize,
        class_sizes: &BTreeMap<usize, usize>,
    ) -> Result<Self, HeadError> {
        Ok(Self {
            angle_std: AngularStd::per_class(base_std, num_classes, class_sizes)?,
        })
    }

    pub const fn angle_std(&self) -> &AngularStd {
        &self.angle_std
    }

    /// # 参数
    /// - `norm_embd`: 已归一化的嵌入 [N, D]
    /// - `labels`: 标签，自适应模式下必需
    ///
    /// # 返回
    /// 旋转后的嵌入 [N, D]，仍为单位长度，与原嵌入的夹角不超过π/2
    pub fn sample(
        &self,
        ctx: &mut Context,
        norm_embd: &Tensor,
        labels: Option<&[usize]>,
    ) -> Result<Tensor, HeadError> {
        let batch_size = norm_embd.shape()[0];
        let angle_std = self.angle_std.for_batch(labels, batch_size)?;

        let (orthogonal, scaled_noise) = ctx.no_grad_scope(|scope| {
            let orthogonal = sphere::random_orthogonal_directions(norm_embd, scope);
            let noise = scope.normal(&[batch_size, 1]);
            (orthogonal, &angle_std * &noise)
        });
        // 切向量退化（一维嵌入，或随机方向恰与嵌入平行）的行不旋转
        let angles = scaled_noise
            .to_vec()
            .into_iter()
            .zip(sphere::row_norms(&orthogonal))
            .map(|(z, tangent_norm)| {
                if tangent_norm < MIN_TANGENT_NORM {
                    0.
                } else {
                    rotation_angle(z)
                }
            })
            .collect::<Vec<_>>();
        let angles = Tensor::new(&angles, &[batch_size, 1]);
        let tangent = sphere::normalize(&orthogonal, 1);
        debug!(
            batch_size,
            adaptive = self.angle_std.is_adaptive(),
            "测地线采样"
        );

        Ok(&(&angles.map(f32::cos) * norm_embd) + &(&angles.map(f32::sin) * &tangent))
    }
}
