/*
 * @Author       : 老董
 * @Date         : 2026-10-11
 * @Description  : 分类头的损失函数
 *
 * - 主分类损失（`ClassificationLoss`）：CrossEntropyLoss、AmSoftmaxLoss
 * - 附加损失（`ExtraLoss`）：LocalPushLoss
 * 所有损失项都以“名称 → 标量张量”的形式汇总到 `LossMap` 中，便于分别求和与记录。
 */

mod am_softmax;
mod cross_entropy;
mod local_push;

pub use am_softmax::AmSoftmaxLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use local_push::LocalPushLoss;

use crate::nn::HeadError;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;
use ndarray::Ix2;
use std::collections::BTreeMap;

#[cfg(test)]
mod tests;

/// 损失名称 → 标量张量（形状为[1]）
pub type LossMap = BTreeMap<String, Tensor>;

/// 主分类损失的计算结果
#[derive(Debug, Clone, PartialEq)]
pub struct LossOutput {
    /// 损失值，形状为[1]
    pub value: Tensor,
    /// 经过尺度标定的损失（如 AM-Softmax）所用的尺度，其余损失为 None
    pub last_scale: Option<f32>,
}

// ==================== 主分类损失 ====================

#[enum_dispatch]
pub trait ClassificationLoss {
    /// # 参数
    /// - `scores`: 打分 [N, C]
    /// - `labels`: 标签 [N]
    fn compute(&self, scores: &Tensor, labels: &[usize]) -> Result<LossOutput, HeadError>;

    /// 计算时所用的尺度（未经尺度标定的损失为 None）
    fn last_scale(&self) -> Option<f32> {
        None
    }
}

#[enum_dispatch(ClassificationLoss)]
#[derive(Debug, Clone)]
pub enum HeadLoss {
    CrossEntropyLoss,
    AmSoftmaxLoss,
}

// ==================== 附加损失 ====================

#[enum_dispatch]
pub trait ExtraLoss {
    /// # 参数
    /// - `norm_embd`: 送入打分层的嵌入 [N, D]（无嵌入模式下为 None）
    /// - `scores`: 打分 [N, C]
    /// - `labels`: 标签 [N]
    fn compute(
        &self,
        norm_embd: Option<&Tensor>,
        scores: &Tensor,
        labels: &[usize],
    ) -> Result<Tensor, HeadError>;
}

#[enum_dispatch(ExtraLoss)]
#[derive(Debug, Clone)]
pub enum AuxLoss {
    LocalPushLoss,
}

/// 汇总所有以`loss/`开头的损失项
pub fn total_loss(losses: &LossMap) -> f32 {
    losses
        .iter()
        .filter(|(name, _)| name.starts_with("loss/"))
        .filter_map(|(_, value)| value.number())
        .sum()
}

/// 校验打分与标签并返回 (N, C)
fn check_scores(scores: &Tensor, labels: &[usize]) -> Result<(usize, usize), HeadError> {
    if scores.dimension() != 2 {
        return Err(HeadError::DimensionMismatch {
            expected: 2,
            got: scores.dimension(),
            message: "打分须为[N, C]".to_string(),
        });
    }
    let (batch_size, num_classes) = (scores.shape()[0], scores.shape()[1]);
    crate::nn::error::check_labels(labels, batch_size, num_classes)?;
    Ok((batch_size, num_classes))
}

/// 逐行 log-softmax（减去行最大值保证数值稳定）
fn log_softmax(logits: &Tensor) -> Tensor {
    let shifted = logits - &logits.max_axis(1, true);
    let log_sum_exp = shifted.map(f32::exp).sum_axis(1, true).map(f32::ln);
    &shifted - &log_sum_exp
}

/// 带标签平滑的 softmax 交叉熵，按批次取均值
fn softmax_cross_entropy(logits: &Tensor, labels: &[usize], label_smoothing: f32) -> f32 {
    let num_classes = logits.shape()[1];
    let log_probs = log_softmax(logits)
        .into_data()
        .into_dimensionality::<Ix2>()
        .expect("打分已校验为2阶");
    let per_sample = labels.iter().enumerate().map(|(i, &label)| {
        let target = log_probs[[i, label]];
        let uniform = log_probs.row(i).sum() / num_classes as f32;
        -((1. - label_smoothing) * target + label_smoothing * uniform)
    });
    per_sample.sum::<f32>() / labels.len().max(1) as f32
}
