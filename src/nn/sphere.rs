/*
 * @Author       : 老董
 * @Date         : 2026-10-09
 * @Description  : 单位超球面上的基础数值操作：归一化、随机方向、切向投影、测地距离
 */

use super::context::NoGradScope;
use crate::tensor::Tensor;
use ndarray::Axis;

/// 归一化时模长的下限，零向量归一化后仍为零向量而不会产生NaN
pub const NORM_EPS: f32 = 1e-12;

/// 沿`axis`维将张量归一化：`v / max(‖v‖, ε)`
///
/// 对形状为`[N, D]`的嵌入，`axis = 1`即逐样本归一化。
pub fn normalize(x: &Tensor, axis: usize) -> Tensor {
    let norms = x
        .data()
        .map_axis(Axis(axis), |lane| lane.dot(&lane).sqrt().max(NORM_EPS))
        .insert_axis(Axis(axis));
    Tensor::from_array(x.data() / &norms)
}

/// 逐行模长，`[N, D]` → `[N]`
pub fn row_norms(x: &Tensor) -> Vec<f32> {
    x.data()
        .map_axis(Axis(1), |row| row.dot(&row).sqrt())
        .iter()
        .copied()
        .collect()
}

/// 逐行点积，`[N, D]`·`[N, D]` → `[N, 1]`
pub fn row_dot(a: &Tensor, b: &Tensor) -> Tensor {
    (a * b).sum_axis(1, true)
}

/// 逐行测地距离 `acos(clamp(a·b, -1, 1))`，两者须已归一化
pub fn angles_between(a: &Tensor, b: &Tensor) -> Vec<f32> {
    row_dot(a, b)
        .to_vec()
        .into_iter()
        .map(|cos| cos.clamp(-1., 1.).acos())
        .collect()
}

/// 为每一行独立抽取一个均匀分布在单位球面上的随机方向（标准正态向量归一化）
pub fn random_unit_directions(shape: &[usize], scope: &mut NoGradScope<'_>) -> Tensor {
    normalize(&scope.normal(shape), 1)
}

/// 把`directions`投影到`norm_embd`各行所在点的切平面上：`d - (e·d) e`
///
/// 结果与对应的嵌入正交，但不再归一化。
pub fn project_to_tangent(directions: &Tensor, norm_embd: &Tensor) -> Tensor {
    let dot_prod = row_dot(norm_embd, directions);
    directions - &(&dot_prod * norm_embd)
}

/// 为每个（已归一化的）嵌入抽取一个与之正交的随机方向
pub fn random_orthogonal_directions(norm_embd: &Tensor, scope: &mut NoGradScope<'_>) -> Tensor {
    let directions = random_unit_directions(norm_embd.shape(), scope);
    project_to_tangent(&directions, norm_embd)
}
