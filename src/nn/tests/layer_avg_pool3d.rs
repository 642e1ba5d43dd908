use crate::assert_err;
use crate::nn::HeadError;
use crate::nn::layer::GlobalAvgPool3d;
use crate::tensor::Tensor;

#[test]
fn test_global_avg_pool3d() -> Result<(), HeadError> {
    // [N=1, C=2, T=2, H=1, W=2]
    let x = Tensor::new(&[1., 2., 3., 4., 10., 20., 30., 40.], &[1, 2, 2, 1, 2]);
    let pooled = GlobalAvgPool3d::new().forward(&x)?;
    assert_eq!(pooled.shape(), &[1, 2, 1, 1, 1]);
    assert_eq!(pooled.to_vec(), vec![2.5, 25.]);
    Ok(())
}

#[test]
fn test_global_avg_pool3d_errors() {
    let pool = GlobalAvgPool3d::new();
    assert_err!(pool.forward(&Tensor::zeros(&[1, 2, 3])), HeadError::DimensionMismatch(5, 3));
    assert_err!(
        pool.forward(&Tensor::zeros(&[1, 2, 0, 1, 1])),
        HeadError::ShapeMismatch([1, 2, 1, 1, 1], [1, 2, 0, 1, 1], "时空维度为空，无法池化")
    );
}
