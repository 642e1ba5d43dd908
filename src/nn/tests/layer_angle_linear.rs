/*
 * @Author       : 老董
 * @Date         : 2026-10-14
 * @Description  : AngleMultipleLinear 单元测试
 */

use crate::assert_err;
use crate::nn::layer::AngleMultipleLinear;
use crate::nn::{HeadError, sphere};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn layer(in_features: usize, num_classes: usize, num_centers: usize) -> AngleMultipleLinear {
    let mut rng = StdRng::seed_from_u64(11);
    AngleMultipleLinear::new(in_features, num_classes, num_centers, 5., 1., 0.1, &mut rng)
}

#[test]
fn test_init_centers_are_unit() {
    let fc = layer(16, 10, 2);
    assert_eq!(fc.weights().shape(), &[16, 20]);
    for norm in sphere::row_norms(&fc.weights().transpose()) {
        assert_abs_diff_eq!(norm, 1., epsilon = 1e-5);
    }
}

#[test]
fn test_single_center_scores_are_cosines() -> Result<(), HeadError> {
    let mut fc = layer(2, 2, 1);
    fc.set_weights(Tensor::new(&[2., 0., 0., 3.], &[2, 2]));
    let embd = Tensor::new(&[0.6, 0.8], &[1, 2]);
    let scores = fc.forward(&embd)?.to_vec();
    assert_abs_diff_eq!(scores[0], 0.6, epsilon = 1e-6);
    assert_abs_diff_eq!(scores[1], 0.8, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_scores_are_bounded() -> Result<(), HeadError> {
    let fc = layer(8, 5, 3);
    let mut rng = StdRng::seed_from_u64(0);
    let embd = sphere::normalize(&Tensor::normal_with_rng(0., 1., &[32, 8], &mut rng), 1);
    let scores = fc.forward(&embd)?;
    assert_eq!(scores.shape(), &[32, 5]);
    assert!(scores.to_vec().iter().all(|s| (-1. ..=1.).contains(s)));
    Ok(())
}

#[test]
fn test_multi_center_softmax_pooling() -> Result<(), HeadError> {
    let mut fc = layer(2, 1, 2);
    fc.set_weights(Tensor::new(&[1., 0., 0., 1.], &[2, 2]));
    let embd = Tensor::new(&[1., 0.], &[1, 2]);
    // 两个中心的余弦为(1, 0)，权重为 softmax(5·(1, 0))
    let expected = 5f32.exp() / (5f32.exp() + 1.);
    assert_abs_diff_eq!(fc.forward(&embd)?.to_vec()[0], expected, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_class_centers() {
    let mut fc = layer(2, 1, 2);
    fc.set_weights(Tensor::new(&[2., 0., 0., 1.], &[2, 2]));
    let centers = fc.class_centers();
    assert_eq!(centers.shape(), &[1, 2]);
    assert_eq!(centers.to_vec(), vec![0.5, 0.5]);

    let mut fc = layer(2, 2, 1);
    fc.set_weights(Tensor::new(&[1., 2., 3., 4.], &[2, 2]));
    assert_eq!(fc.class_centers().to_vec(), vec![1., 3., 2., 4.]);
}

#[test]
fn test_center_push_loss() {
    let mut fc = layer(2, 1, 2);
    assert!(layer(2, 3, 1).loss("").is_empty());

    // 同类两个中心重合：relu(1 - 0.1) = 0.9
    fc.set_weights(Tensor::new(&[1., 1., 0., 0.], &[2, 2]));
    let losses = fc.loss("_v");
    let value = losses["loss/cpush_v"].number().unwrap();
    assert_abs_diff_eq!(value, 0.9, epsilon = 1e-6);

    // 同类两个中心正交：无惩罚
    fc.set_weights(Tensor::new(&[1., 0., 0., 1.], &[2, 2]));
    assert_eq!(fc.loss("")["loss/cpush"].number(), Some(0.));
}

#[test]
fn test_input_shape_mismatch() {
    let fc = layer(4, 2, 1);
    assert_err!(
        fc.forward(&Tensor::zeros(&[3, 5])),
        HeadError::ShapeMismatch([3, 4], [3, 5], "角度打分层的输入形状不符")
    );
}
