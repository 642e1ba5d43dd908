/*
 * @Author       : 老董
 * @Date         : 2026-10-10
 * @Description  : 1×1×1 的三维卷积（逐位置的通道线性变换），无偏置
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, T, H, W]
 * - 输出：[batch_size, out_channels, T, H, W]
 */

use crate::nn::{HeadError, Init, Module};
use crate::tensor::Tensor;
use rand::Rng;

/// 1×1×1 卷积层
///
/// 卷积核按 PyTorch 的 `[out_channels, in_channels]`（省略三个为1的核维度）存放，
/// 因此 `Init::Kaiming` 取 `shape[0] = out_channels` 作为扇出。
#[derive(Debug, Clone)]
pub struct PointwiseConv3d {
    /// 卷积核参数 [out_channels, in_channels]
    kernel: Tensor,
    in_channels: usize,
    out_channels: usize,
}

impl PointwiseConv3d {
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        init: Init,
        rng: &mut R,
    ) -> Self {
        Self {
            kernel: init.generate_with_rng(&[out_channels, in_channels], rng),
            in_channels,
            out_channels,
        }
    }

    /// 前向传播
    ///
    /// # 参数
    /// - `x`: 输入，形状 [N, in_channels, T, H, W]
    ///
    /// # 返回
    /// 输出，形状 [N, out_channels, T, H, W]
    pub fn forward(&self, x: &Tensor) -> Result<Tensor, HeadError> {
        if x.dimension() != 5 {
            return Err(HeadError::DimensionMismatch {
                expected: 5,
                got: x.dimension(),
                message: "Conv3d 的输入须为[N, C, T, H, W]".to_string(),
            });
        }
        let (n, c, t, h, w) = (x.shape()[0], x.shape()[1], x.shape()[2], x.shape()[3], x.shape()[4]);
        if c != self.in_channels {
            return Err(HeadError::shape_mismatch(
                &[n, self.in_channels, t, h, w],
                x.shape(),
                "Conv3d 输入通道数不符",
            ));
        }
        // [N, C, T, H, W] -> [N*T*H*W, C] @ [C, O] -> [N, O, T, H, W]
        let positions = x.permute(&[0, 2, 3, 4, 1]).reshape(&[n * t * h * w, c]);
        let projected = positions.mat_mul(&self.kernel.transpose());
        Ok(projected
            .reshape(&[n, t, h, w, self.out_channels])
            .permute(&[0, 4, 1, 2, 3]))
    }

    pub const fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub const fn out_channels(&self) -> usize {
        self.out_channels
    }

    pub const fn kernel(&self) -> &Tensor {
        &self.kernel
    }
}

impl Module for PointwiseConv3d {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        vec![("weight".to_string(), &self.kernel)]
    }
}
