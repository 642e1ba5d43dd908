/*
 * @Author       : 老董
 * @Date         : 2026-10-11
 * @Description  : 局部推离损失：负类得分不得逼近正类得分
 *
 * 对每个样本：mean_{j≠y} max(0, s_j - s_y + margin)，再按批次取均值并乘以权重。
 */

use super::{ExtraLoss, check_scores};
use crate::nn::HeadError;
use crate::tensor::Tensor;
use ndarray::Ix2;

#[derive(Debug, Clone)]
pub struct LocalPushLoss {
    margin: f32,
    weight: f32,
}

impl LocalPushLoss {
    pub const fn new(margin: f32, weight: f32) -> Self {
        Self { margin, weight }
    }
}

impl ExtraLoss for LocalPushLoss {
    fn compute(
        &self,
        _norm_embd: Option<&Tensor>,
        scores: &Tensor,
        labels: &[usize],
    ) -> Result<Tensor, HeadError> {
        let (batch_size, num_classes) = check_scores(scores, labels)?;
        if num_classes < 2 || batch_size == 0 {
            return Ok(Tensor::from(0.));
        }
        let scores = scores
            .view()
            .into_dimensionality::<Ix2>()
            .expect("打分已校验为2阶");
        let mut total = 0.;
        for (i, &label) in labels.iter().enumerate() {
            let positive = scores[[i, label]];
            let violation: f32 = (0..num_classes)
                .filter(|&j| j != label)
                .map(|j| (scores[[i, j]] - positive + self.margin).max(0.))
                .sum();
            total += violation / (num_classes - 1) as f32;
        }
        Ok(Tensor::from(self.weight * total / batch_size as f32))
    }
}
