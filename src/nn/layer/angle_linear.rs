/*
 * @Author       : 老董
 * @Date         : 2026-10-10
 * @Description  : AngleMultipleLinear：角度打分层（每类可有多个中心）
 *
 * 输入为已归一化的嵌入 [N, D]，输出为每个类别的余弦得分 [N, C]：
 * - 每类1个中心：得分即嵌入与该类中心的余弦
 * - 每类K个中心：对K个余弦以 `st_scale` 为温度做 softmax 加权求和
 * 多中心时附带一个“中心互斥”正则：同类中心两两余弦超过阈值的部分计入损失。
 */

use crate::nn::loss::LossMap;
use crate::nn::{HeadError, Init, Module, sphere};
use crate::tensor::Tensor;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct AngleMultipleLinear {
    /// 类中心 [D, C*K]，第 `c*K + k` 列为第c类的第k个中心
    weights: Tensor,
    in_features: usize,
    num_classes: usize,
    num_centers: usize,
    st_scale: f32,
    reg_weight: f32,
    reg_threshold: f32,
}

impl AngleMultipleLinear {
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        num_classes: usize,
        num_centers: usize,
        st_scale: f32,
        reg_weight: f32,
        reg_threshold: f32,
        rng: &mut R,
    ) -> Self {
        let weights =
            Init::UnitColumns.generate_with_rng(&[in_features, num_classes * num_centers], rng);
        Self {
            weights,
            in_features,
            num_classes,
            num_centers,
            st_scale,
            reg_weight,
            reg_threshold,
        }
    }

    /// 计算每个类别的得分
    ///
    /// # 参数
    /// - `norm_embd`: 已归一化的嵌入 [N, D]
    ///
    /// # 返回
    /// 得分 [N, C]，取值在[-1, 1]内
    pub fn forward(&self, norm_embd: &Tensor) -> Result<Tensor, HeadError> {
        if norm_embd.dimension() != 2 || norm_embd.shape()[1] != self.in_features {
            return Err(HeadError::shape_mismatch(
                &[norm_embd.shape().first().copied().unwrap_or(0), self.in_features],
                norm_embd.shape(),
                "角度打分层的输入形状不符",
            ));
        }
        let normalized_weights = sphere::normalize(&self.weights, 0);
        let prod = norm_embd.mat_mul(&normalized_weights).clamp(-1., 1.);
        if self.num_centers == 1 {
            return Ok(prod);
        }

        let batch_size = norm_embd.shape()[0];
        let prod = prod.reshape(&[batch_size, self.num_classes, self.num_centers]);
        let center_weights = (&prod * self.st_scale).softmax(2);
        Ok((&center_weights * &prod).sum_axis(2, false))
    }

    /// 每个类别的代表中心 [C, D]
    ///
    /// 单中心时即该类中心本身；多中心时取该类各（归一化）中心的均值。
    /// 返回值未归一化，由调用方按需归一化。
    pub fn class_centers(&self) -> Tensor {
        let centers = self.weights.transpose(); // [C*K, D]
        if self.num_centers == 1 {
            return centers;
        }
        sphere::normalize(&centers, 1)
            .reshape(&[self.num_classes, self.num_centers, self.in_features])
            .mean_axis(1, false)
    }

    /// 本层自带的正则损失，键名为 `loss/cpush{name}`；单中心或权重为0时为空
    pub fn loss(&self, name: &str) -> LossMap {
        let mut losses = LossMap::new();
        if self.num_centers <= 1 || self.reg_weight <= 0. {
            return losses;
        }

        // [C*K, D] -> 每类K个归一化中心
        let centers = sphere::normalize(&self.weights.transpose(), 1).to_vec();
        let (k, d) = (self.num_centers, self.in_features);
        let center = |class_id: usize, center_id: usize| {
            let start = (class_id * k + center_id) * d;
            &centers[start..start + d]
        };

        let mut total = 0.;
        let mut pairs = 0usize;
        for class_id in 0..self.num_classes {
            for i in 0..k {
                for j in (i + 1)..k {
                    let cos: f32 = center(class_id, i)
                        .iter()
                        .zip(center(class_id, j))
                        .map(|(a, b)| a * b)
                        .sum();
                    total += (cos - self.reg_threshold).max(0.);
                    pairs += 1;
                }
            }
        }
        losses.insert(
            format!("loss/cpush{name}"),
            Tensor::from(self.reg_weight * total / pairs as f32),
        );
        losses
    }

    pub const fn weights(&self) -> &Tensor {
        &self.weights
    }

    /// 替换类中心（外部优化器在两次前向之间调用）
    ///
    /// # Panics
    /// 新权重形状与原权重不一致时
    pub fn set_weights(&mut self, weights: Tensor) {
        assert_eq!(weights.shape(), self.weights.shape(), "类中心矩阵形状不可改变");
        self.weights = weights;
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub const fn num_centers(&self) -> usize {
        self.num_centers
    }
}

impl Module for AngleMultipleLinear {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        vec![("weight".to_string(), &self.weights)]
    }
}
