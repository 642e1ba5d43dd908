/*
 * @Author       : 老董
 * @Date         : 2026-10-10
 * @Description  : BatchNorm3d 层
 *
 * - 训练模式：用当前批次的统计量归一化，并以动量更新滑动均值/方差（方差取无偏估计）
 * - 推理模式：用滑动统计量归一化
 * 统计量在 (N, T, H, W) 上逐通道计算；训练模式下每个通道须有多于1个值。
 */

use crate::nn::{HeadError, Module};
use crate::tensor::Tensor;

pub const BN_EPS: f32 = 1e-5;
pub const BN_MOMENTUM: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct BatchNorm3d {
    /// 缩放参数 [C]，初始化为1
    gamma: Tensor,
    /// 平移参数 [C]，初始化为0
    beta: Tensor,
    /// 滑动均值 [C]
    running_mean: Tensor,
    /// 滑动方差 [C]
    running_var: Tensor,
    num_features: usize,
}

impl BatchNorm3d {
    pub fn new(num_features: usize) -> Self {
        Self {
            gamma: Tensor::ones(&[num_features]),
            beta: Tensor::zeros(&[num_features]),
            running_mean: Tensor::zeros(&[num_features]),
            running_var: Tensor::ones(&[num_features]),
            num_features,
        }
    }

    /// 前向传播
    ///
    /// # 参数
    /// - `x`: 输入，形状 [N, C, T, H, W]
    /// - `is_train_mode`: 是否使用（并更新）批次统计量
    pub fn forward(&mut self, x: &Tensor, is_train_mode: bool) -> Result<Tensor, HeadError> {
        if x.dimension() != 5 {
            return Err(HeadError::DimensionMismatch {
                expected: 5,
                got: x.dimension(),
                message: "BatchNorm3d 的输入须为[N, C, T, H, W]".to_string(),
            });
        }
        let shape = x.shape().to_vec();
        let c = shape[1];
        if c != self.num_features {
            return Err(HeadError::shape_mismatch(
                &[shape[0], self.num_features, shape[2], shape[3], shape[4]],
                &shape,
                "BatchNorm3d 通道数不符",
            ));
        }
        let count = shape[0] * shape[2] * shape[3] * shape[4];
        if is_train_mode && count <= 1 {
            return Err(HeadError::shape_mismatch(
                &[2, c, 1, 1, 1],
                &shape,
                "训练模式下 BatchNorm3d 每个通道须有多于1个值",
            ));
        }
        // [N, C, T, H, W] -> [C, N*T*H*W]
        let per_channel = x.permute(&[1, 0, 2, 3, 4]).reshape(&[c, count]);

        let (mean, var) = if is_train_mode {
            let mean = per_channel.mean_axis(1, true);
            let centered = &per_channel - &mean;
            let var = (&centered * &centered).mean_axis(1, true);
            self.update_running_stats(&mean, &var, count);
            (mean, var)
        } else {
            (
                self.running_mean.reshape(&[c, 1]),
                self.running_var.reshape(&[c, 1]),
            )
        };

        let inv_std = (&var + BN_EPS).map(|v| 1. / v.sqrt());
        let normalized = &(&per_channel - &mean) * &inv_std;
        let affine = &(&normalized * &self.gamma.reshape(&[c, 1])) + &self.beta.reshape(&[c, 1]);

        Ok(affine
            .reshape(&[c, shape[0], shape[2], shape[3], shape[4]])
            .permute(&[1, 0, 2, 3, 4]))
    }

    fn update_running_stats(&mut self, mean: &Tensor, var: &Tensor, count: usize) {
        let c = self.num_features;
        let unbiased = var * (count as f32 / (count - 1) as f32);
        self.running_mean =
            &(&self.running_mean * (1. - BN_MOMENTUM)) + &(mean.reshape(&[c]) * BN_MOMENTUM);
        self.running_var =
            &(&self.running_var * (1. - BN_MOMENTUM)) + &(unbiased.reshape(&[c]) * BN_MOMENTUM);
    }

    pub const fn num_features(&self) -> usize {
        self.num_features
    }

    pub const fn running_mean(&self) -> &Tensor {
        &self.running_mean
    }

    pub const fn running_var(&self) -> &Tensor {
        &self.running_var
    }
}

impl Module for BatchNorm3d {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        vec![
            ("weight".to_string(), &self.gamma),
            ("bias".to_string(), &self.beta),
        ]
    }

    fn named_buffers(&self) -> Vec<(String, &Tensor)> {
        vec![
            ("running_mean".to_string(), &self.running_mean),
            ("running_var".to_string(), &self.running_var),
        ]
    }
}
