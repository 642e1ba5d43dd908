use crate::nn::HeadError;
use crate::nn::loss::{AmSoftmaxLoss, ClassificationLoss, CrossEntropyLoss, HeadLoss};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_am_softmax_margin_shifts_positive_logit() -> Result<(), HeadError> {
    // 正类余弦减去间隔后与负类相等，损失退化为 ln2
    let scores = Tensor::new(&[0.5, 0.2], &[1, 2]);
    let output = AmSoftmaxLoss::new(10., 0.3).compute(&scores, &[0])?;
    assert_abs_diff_eq!(output.value.number().unwrap(), 2f32.ln(), epsilon = 1e-5);
    assert_eq!(output.last_scale, Some(10.));
    Ok(())
}

#[test]
fn test_am_softmax_zero_margin_matches_scaled_cross_entropy() -> Result<(), HeadError> {
    let scores = Tensor::new(&[0.9, -0.1, 0.3, 0.2, 0.6, -0.5], &[2, 3]);
    let labels = [0, 1];
    let am = AmSoftmaxLoss::new(5., 0.).compute(&scores, &labels)?.value;
    let ce = CrossEntropyLoss::new()
        .compute(&(&scores * 5.), &labels)?
        .value;
    assert_abs_diff_eq!(am.number().unwrap(), ce.number().unwrap(), epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_am_softmax_last_scale_through_dispatch() {
    let loss = HeadLoss::from(AmSoftmaxLoss::new(30., 0.35));
    assert_eq!(loss.last_scale(), Some(30.));
}

#[test]
fn test_am_softmax_invalid_params() {
    crate::assert_panic!(AmSoftmaxLoss::new(0., 0.1));
    crate::assert_panic!(AmSoftmaxLoss::new(1., -0.1));
}
