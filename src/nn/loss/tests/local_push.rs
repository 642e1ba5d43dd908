use crate::nn::HeadError;
use crate::nn::loss::{ExtraLoss, LocalPushLoss};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_local_push_counts_only_close_negatives() -> Result<(), HeadError> {
    let scores = Tensor::new(&[0.5, 0.45, 0.1], &[1, 3]);
    let value = LocalPushLoss::new(0.1, 1.).compute(None, &scores, &[0])?;
    // 只有第1类落在间隔内：(0.45 - 0.5 + 0.1) / 2
    assert_abs_diff_eq!(value.number().unwrap(), 0.025, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_local_push_weight_and_batch_mean() -> Result<(), HeadError> {
    let scores = Tensor::new(&[0.9, 0.1, 0.2, 0.4], &[2, 2]);
    let value = LocalPushLoss::new(0.1, 2.).compute(None, &scores, &[0, 0])?;
    // 样本0无违例；样本1：0.4 - 0.2 + 0.1 = 0.3
    assert_abs_diff_eq!(value.number().unwrap(), 2. * 0.3 / 2., epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_local_push_well_separated_is_zero() -> Result<(), HeadError> {
    let scores = Tensor::new(&[1., -1., -1.], &[1, 3]);
    let value = LocalPushLoss::new(0.5, 1.).compute(None, &scores, &[0])?;
    assert_eq!(value.number(), Some(0.));
    Ok(())
}
