/*
 * @Author       : 老董
 * @Date         : 2026-10-14
 * @Description  : 超球面工具函数单元测试
 */

use crate::nn::{Context, sphere};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use std::f32::consts::FRAC_PI_2;

#[test]
fn test_normalize_rows() {
    let x = Tensor::new(&[3., 4., 0., 0., 0., 2.], &[2, 3]);
    let normalized = sphere::normalize(&x, 1);
    assert_eq!(normalized.to_vec(), vec![0.6, 0.8, 0., 0., 0., 1.]);
}

#[test]
fn test_normalize_zero_vector_stays_zero() {
    let x = Tensor::zeros(&[2, 4]);
    let normalized = sphere::normalize(&x, 1);
    assert!(!normalized.has_non_finite());
    assert_eq!(normalized, Tensor::zeros(&[2, 4]));
}

#[test]
fn test_normalize_columns() {
    let x = Tensor::new(&[3., 0., 4., 5.], &[2, 2]);
    let normalized = sphere::normalize(&x, 0);
    assert_eq!(normalized.to_vec(), vec![0.6, 0., 0.8, 1.]);
}

#[test]
fn test_random_directions_are_unit() {
    let mut ctx = Context::new_with_seed(3);
    let directions = ctx.no_grad_scope(|scope| sphere::random_unit_directions(&[16, 8], scope));
    for norm in sphere::row_norms(&directions) {
        assert_abs_diff_eq!(norm, 1., epsilon = 1e-5);
    }
}

#[test]
fn test_orthogonal_directions() {
    let mut ctx = Context::new_with_seed(5);
    let embd = ctx.no_grad_scope(|scope| sphere::random_unit_directions(&[16, 8], scope));
    let tangent = ctx.no_grad_scope(|scope| sphere::random_orthogonal_directions(&embd, scope));
    for dot in sphere::row_dot(&embd, &tangent).to_vec() {
        assert_abs_diff_eq!(dot, 0., epsilon = 1e-5);
    }
}

#[test]
fn test_project_to_tangent() {
    let embd = Tensor::new(&[1., 0.], &[1, 2]);
    let directions = Tensor::new(&[0.6, 0.8], &[1, 2]);
    let tangent = sphere::project_to_tangent(&directions, &embd);
    assert_eq!(tangent.to_vec(), vec![0., 0.8]);
}

#[test]
fn test_angles_between() {
    let a = Tensor::new(&[1., 0., 1., 0.], &[2, 2]);
    let b = Tensor::new(&[0., 1., 1., 0.], &[2, 2]);
    let angles = sphere::angles_between(&a, &b);
    assert_abs_diff_eq!(angles[0], FRAC_PI_2, epsilon = 1e-6);
    assert_abs_diff_eq!(angles[1], 0., epsilon = 1e-6);
}
