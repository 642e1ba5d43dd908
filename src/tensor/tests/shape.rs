use crate::assert_panic;
use crate::errors::{ComparisonOperator, TensorError};
use crate::tensor::Tensor;

#[test]
fn test_is_same_shape() {
    let tensor1 = Tensor::new(&[1., 2., 3., 4.], &[1, 4]);
    let tensor2 = Tensor::new(&[1., 2., 3., 4.], &[1, 4]);
    assert!(tensor1.is_same_shape(&tensor2));

    let tensor2 = Tensor::new(&[1., 2., 3., 4.], &[4, 1]);
    assert!(!tensor1.is_same_shape(&tensor2));
}

#[test]
fn test_reshape() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let reshaped = tensor.reshape(&[3, 2]);
    assert_eq!(reshaped.shape(), &[3, 2]);
    assert_eq!(reshaped.to_vec(), tensor.to_vec());

    assert_panic!(tensor.reshape(&[4, 2]), TensorError::IncompatibleShape);
}

#[test]
fn test_unsqueeze() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    assert_eq!(tensor.unsqueeze(0).shape(), &[1, 2, 2]);
    assert_eq!(tensor.unsqueeze(2).shape(), &[2, 2, 1]);
    assert_eq!(tensor.unsqueeze(-1).shape(), &[2, 2, 1]);
    assert_panic!(tensor.unsqueeze(4));
}

#[test]
fn test_permute_and_transpose() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let transposed = tensor.transpose();
    assert_eq!(transposed.shape(), &[3, 2]);
    assert_eq!(transposed.to_vec(), vec![1., 4., 2., 5., 3., 6.]);

    let tensor = Tensor::new(&[0.; 24], &[2, 3, 4]);
    assert_eq!(tensor.permute(&[2, 0, 1]).shape(), &[4, 2, 3]);
    assert_panic!(
        tensor.permute(&[0, 0, 1]),
        TensorError::PermuteNeedUniqueAndInRange
    );
}

#[test]
fn test_can_broadcast_with() {
    let a = Tensor::zeros(&[3, 4]);
    assert!(a.can_broadcast_with(&Tensor::zeros(&[3, 1])));
    assert!(a.can_broadcast_with(&Tensor::zeros(&[4])));
    assert!(a.can_broadcast_with(&Tensor::zeros(&[1])));
    assert!(!a.can_broadcast_with(&Tensor::zeros(&[2, 4])));
}

#[test]
fn test_concat() {
    let a = Tensor::new(&[1., 2.], &[1, 2]);
    let b = Tensor::new(&[3., 4., 5., 6.], &[2, 2]);
    let rows = Tensor::concat(&[&a, &b], 0);
    assert_eq!(rows.shape(), &[3, 2]);
    assert_eq!(rows.to_vec(), vec![1., 2., 3., 4., 5., 6.]);

    let c = Tensor::new(&[7., 8.], &[2, 1]);
    let cols = Tensor::concat(&[&b, &c], 1);
    assert_eq!(cols.to_vec(), vec![3., 4., 7., 5., 6., 8.]);

    assert_panic!(Tensor::concat(&[], 0), TensorError::EmptyList);
}

#[test]
fn test_select_rows() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]);
    let selected = tensor.select_rows(&[2, 0, 2]);
    assert_eq!(selected.shape(), &[3, 2]);
    assert_eq!(selected.to_vec(), vec![5., 6., 1., 2., 5., 6.]);
}

#[test]
fn test_select_rows_out_of_range() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    assert_panic!(
        tensor.select_rows(&[0, 2]),
        TensorError::ValueMustSatisfyComparison {
            value_name: "行下标".to_string(),
            operator: ComparisonOperator::LessThan,
            threshold: 2,
        }
    );
}
