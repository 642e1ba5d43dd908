/*
 * @Author       : 老董
 * @Date         : 2026-10-11
 * @Description  : AM-Softmax（加性余弦间隔）损失
 *
 * logits = scale * (cos - margin * onehot(label))，再做交叉熵。
 * 输入打分须为余弦（角度打分层的输出）。
 */

use super::{ClassificationLoss, LossOutput, check_scores, softmax_cross_entropy};
use crate::nn::HeadError;
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct AmSoftmaxLoss {
    scale: f32,
    margin: f32,
}

impl AmSoftmaxLoss {
    /// # Panics
    /// `scale`不为正或`margin`为负时
    pub fn new(scale: f32, margin: f32) -> Self {
        assert!(scale > 0., "AM-Softmax 的尺度须为正，实际为{scale}");
        assert!(margin >= 0., "AM-Softmax 的间隔不能为负，实际为{margin}");
        Self { scale, margin }
    }

    pub const fn scale(&self) -> f32 {
        self.scale
    }

    pub const fn margin(&self) -> f32 {
        self.margin
    }
}

impl ClassificationLoss for AmSoftmaxLoss {
    fn compute(&self, scores: &Tensor, labels: &[usize]) -> Result<LossOutput, HeadError> {
        let (batch_size, num_classes) = check_scores(scores, labels)?;
        let mut margins = vec![0.; batch_size * num_classes];
        for (i, &label) in labels.iter().enumerate() {
            margins[i * num_classes + label] = self.margin;
        }
        let margins = Tensor::new(&margins, &[batch_size, num_classes]);
        let logits = &(scores - &margins) * self.scale;
        Ok(LossOutput {
            value: Tensor::from(softmax_cross_entropy(&logits, labels, 0.)),
            last_scale: Some(self.scale),
        })
    }

    fn last_scale(&self) -> Option<f32> {
        Some(self.scale)
    }
}
