use super::Tensor;
use crate::errors::{ComparisonOperator, TensorError};
use ndarray::{Axis, IxDyn};
use std::collections::HashSet;

impl Tensor {
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let total_elements: usize = self.data.len();
        let new_total_elements: usize = shape.iter().product();
        assert!(
            total_elements == new_total_elements,
            "{}",
            TensorError::IncompatibleShape
        );
        let data = self
            .data
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(shape))
            .expect("元素数已校验，重塑不会失败");
        Self { data }
    }

    /// 在指定维度上增加一个维度。
    ///
    /// * `dim` - 要增加维度的索引。若`dim`为正数或零，则从头开始计数；
    /// 若`dim`为负数，则从末尾开始计数。例如，-1表示在最后一个维度后增加。
    ///
    /// # 示例
    ///
    /// ```ignore
    /// let tensor = Tensor::new(&[1.0, 2.0, 3.0], &[3]);
    /// let unsqueezed = tensor.unsqueeze(0); // 在最前面增加一个维度
    /// assert_eq!(unsqueezed.shape(), &[1, 3]);
    /// ```
    pub fn unsqueeze(&self, dim: i8) -> Self {
        let dim = if dim < 0 {
            self.dimension() as i8 + dim + 1
        } else {
            dim
        };
        assert!(
            dim >= 0 && dim as usize <= self.dimension(),
            "{}",
            TensorError::AxisOutOfRange {
                axis: dim.max(0) as usize,
                dimension: self.dimension(),
            }
        );

        let mut new_shape = self.data.shape().to_vec();
        new_shape.insert(dim as usize, 1);
        self.reshape(&new_shape)
    }

    /// 交换张量的两个（以上）维度，并将其返回（不影响原张量）
    pub fn permute(&self, axes: &[usize]) -> Self {
        // 检查axes中的所有元素必须是唯一且在[0, <张量维数>)范围内
        let unique_axes = axes.iter().copied().collect::<HashSet<_>>();
        assert!(
            unique_axes.len() == axes.len()
                && axes.len() == self.dimension()
                && unique_axes.iter().all(|&a| a < self.dimension()),
            "{}",
            TensorError::PermuteNeedUniqueAndInRange
        );

        let permuted = self.data.clone().permuted_axes(IxDyn(axes));
        Self {
            data: permuted.as_standard_layout().into_owned(),
        }
    }

    /// 判断两个张量能否按 NumPy 风格广播
    ///
    /// # 广播规则
    /// - 从右向左对齐维度
    /// - 每个维度必须相等，或其中一个为 1
    /// - 维度数不同时，较短的形状前面补 1
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        self.shape()
            .iter()
            .rev()
            .zip(other.shape().iter().rev())
            .all(|(&a, &b)| a == b || a == 1 || b == 1)
    }

    /// 将多个张量沿着`axis`维拼接起来，除`axis`外的其余维度必须一致
    pub fn concat(tensors: &[&Self], axis: usize) -> Self {
        assert!(!tensors.is_empty(), "{}", TensorError::EmptyList);
        let dimension = tensors[0].dimension();
        assert!(
            axis < dimension,
            "{}",
            TensorError::AxisOutOfRange { axis, dimension }
        );
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(Axis(axis), &views)
            .unwrap_or_else(|_| panic!("{}", TensorError::IncompatibleShape));
        Self { data }
    }

    /// 按`indices`挑出首个维度上的若干“行”，组成新的张量（可重复挑选同一行）
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        assert!(self.dimension() >= 1, "{}", TensorError::IncompatibleShape);
        let rows = self.shape()[0];
        assert!(
            indices.iter().all(|&i| i < rows),
            "{}",
            TensorError::ValueMustSatisfyComparison {
                value_name: "行下标".to_string(),
                operator: ComparisonOperator::LessThan,
                threshold: rows,
            }
        );
        Self {
            data: self.data.select(Axis(0), indices),
        }
    }
}
