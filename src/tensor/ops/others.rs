use crate::errors::TensorError;
use crate::tensor::Tensor;
use ndarray::Axis;
use std::cmp::PartialEq;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Self::new(&[scalar], &[1])
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Tensor {
    /// 对张量中的所有元素求和并返回一个形状为[1]的标量。
    pub fn sum(&self) -> Self {
        Self::from(self.data.sum())
    }

    /// 对张量中的所有元素求均值并返回一个形状为[1]的标量（空张量的均值为0）
    pub fn mean(&self) -> Self {
        Self::from(self.data.mean().unwrap_or(0.))
    }

    /// 沿`axis`维求和。`keep_dim`为true时该维保留为1，便于与原张量广播
    pub fn sum_axis(&self, axis: usize, keep_dim: bool) -> Self {
        self.assert_axis(axis);
        let summed = self.data.sum_axis(Axis(axis));
        Self {
            data: if keep_dim {
                summed.insert_axis(Axis(axis))
            } else {
                summed
            },
        }
    }

    /// 沿`axis`维求均值。`keep_dim`为true时该维保留为1
    pub fn mean_axis(&self, axis: usize, keep_dim: bool) -> Self {
        self.assert_axis(axis);
        let len = self.shape()[axis];
        assert!(len > 0, "{}", TensorError::DivByZero);
        &self.sum_axis(axis, keep_dim) / len as f32
    }

    /// 沿`axis`维求最大值。`keep_dim`为true时该维保留为1
    pub fn max_axis(&self, axis: usize, keep_dim: bool) -> Self {
        self.assert_axis(axis);
        let maxed = self
            .data
            .map_axis(Axis(axis), |lane| lane.fold(f32::NEG_INFINITY, |a, &b| a.max(b)));
        Self {
            data: if keep_dim {
                maxed.insert_axis(Axis(axis))
            } else {
                maxed
            },
        }
    }

    /// 沿`axis`维做 softmax（先减去最大值以保证数值稳定）
    pub fn softmax(&self, axis: usize) -> Self {
        let shifted = self - &self.max_axis(axis, true);
        let exp = shifted.map(f32::exp);
        &exp / &exp.sum_axis(axis, true)
    }

    /// 对每个元素应用`f`，返回新张量
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.mapv(f),
        }
    }

    /// 将每个元素限制在[min, max]内
    pub fn clamp(&self, min: f32, max: f32) -> Self {
        self.map(|x| x.clamp(min, max))
    }

    /// 逐元素取绝对值
    pub fn abs(&self) -> Self {
        self.map(f32::abs)
    }

    fn assert_axis(&self, axis: usize) {
        assert!(
            axis < self.dimension(),
            "{}",
            TensorError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            }
        );
    }
}
