/*
 * @Author       : 老董
 * @Date         : 2026-10-13
 * @Description  : 类中心混合：把每个嵌入朝一个随机的“非本类”中心拉近一小步
 *
 * e' = normalize((1 - α) e + α ĉ_neg)，其中 α = alpha · u，u ~ U[0, 1)，
 * neg 在除真实标签外的 C-1 个类别中均匀抽取。
 */

use crate::nn::context::NoGradScope;
use crate::nn::error::check_labels;
use crate::nn::{Context, HeadError, sphere};
use crate::tensor::Tensor;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct ClassMixer {
    alpha: f32,
    num_classes: usize,
}

impl ClassMixer {
    pub fn new(alpha: f32, num_classes: usize) -> Result<Self, HeadError> {
        if num_classes < 2 {
            return Err(HeadError::invalid_config("类中心混合至少需要2个类别"));
        }
        if !(0. ..1.).contains(&alpha) {
            return Err(HeadError::invalid_config(format!(
                "混合系数须在[0, 1)内，实际为{alpha}"
            )));
        }
        Ok(Self { alpha, num_classes })
    }

    pub const fn alpha(&self) -> f32 {
        self.alpha
    }

    /// # 参数
    /// - `norm_embd`: 已归一化的嵌入 [N, D]
    /// - `labels`: 真实标签 [N]
    /// - `norm_centers`: 已归一化的类中心 [C, D]
    ///
    /// # 返回
    /// 混合后重新归一化的嵌入 [N, D]
    pub fn mix(
        &self,
        ctx: &mut Context,
        norm_embd: &Tensor,
        labels: &[usize],
        norm_centers: &Tensor,
    ) -> Result<Tensor, HeadError> {
        let batch_size = norm_embd.shape()[0];
        check_labels(labels, batch_size, self.num_classes)?;
        if norm_centers.shape() != [self.num_classes, norm_embd.shape()[1]] {
            return Err(HeadError::shape_mismatch(
                &[self.num_classes, norm_embd.shape()[1]],
                norm_centers.shape(),
                "类中心矩阵形状与嵌入不符",
            ));
        }

        let max_alpha = self.alpha;
        let num_classes = self.num_classes;
        let (negative_ids, alpha) = ctx.no_grad_scope(|scope| {
            let negative_ids = draw_negative_classes(scope, labels, num_classes);
            let alpha = &scope.uniform(&[batch_size, 1]) * max_alpha;
            (negative_ids, alpha)
        });
        debug!(batch_size, max_alpha, "类中心混合");

        let random_centers = norm_centers.select_rows(&negative_ids);
        let mixed = &(&(1. - &alpha) * norm_embd) + &(&alpha * &random_centers);
        Ok(sphere::normalize(&mixed, 1))
    }
}

/// 为每个标签在其余`num_classes - 1`个类别中均匀抽取一个负类
///
/// 先在[0, C-1)内抽取，再把不小于真实标签的值后移一位，从而跳过真实标签。
pub fn draw_negative_classes(
    scope: &mut NoGradScope<'_>,
    labels: &[usize],
    num_classes: usize,
) -> Vec<usize> {
    scope
        .randint(num_classes - 1, labels.len())
        .into_iter()
        .zip(labels)
        .map(|(candidate, &label)| if candidate < label { candidate } else { candidate + 1 })
        .collect()
}
