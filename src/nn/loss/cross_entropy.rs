/*
 * @Author       : 老董
 * @Date         : 2026-10-11
 * @Description  : softmax 交叉熵损失（可选标签平滑）
 */

use super::{ClassificationLoss, LossOutput, check_scores, softmax_cross_entropy};
use crate::nn::HeadError;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default)]
pub struct CrossEntropyLoss {
    label_smoothing: f32,
}

impl CrossEntropyLoss {
    pub const fn new() -> Self {
        Self {
            label_smoothing: 0.,
        }
    }

    /// # Panics
    /// `label_smoothing`不在[0, 1)内时
    pub fn with_label_smoothing(label_smoothing: f32) -> Self {
        assert!(
            (0. ..1.).contains(&label_smoothing),
            "标签平滑系数须在[0, 1)内，实际为{label_smoothing}"
        );
        Self { label_smoothing }
    }
}

impl ClassificationLoss for CrossEntropyLoss {
    fn compute(&self, scores: &Tensor, labels: &[usize]) -> Result<LossOutput, HeadError> {
        check_scores(scores, labels)?;
        Ok(LossOutput {
            value: Tensor::from(softmax_cross_entropy(scores, labels, self.label_smoothing)),
            last_scale: None,
        })
    }
}
