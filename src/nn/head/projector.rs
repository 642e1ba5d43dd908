/*
 * @Author       : 老董
 * @Date         : 2026-10-12
 * @Description  : 嵌入投影：通道数与嵌入维度不同时做 1×1×1 卷积 + BatchNorm3d，否则恒等
 */

use super::squash::flatten;
use crate::nn::layer::{BatchNorm3d, PointwiseConv3d};
use crate::nn::module::prefixed;
use crate::nn::{HeadError, Init, Module};
use crate::tensor::Tensor;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct EmbeddingProjector {
    reduce: Option<(PointwiseConv3d, BatchNorm3d)>,
    in_channels: usize,
    embd_size: usize,
}

impl EmbeddingProjector {
    /// 卷积核按 Kaiming 正态（扇出模式）初始化，BatchNorm 的缩放为1、平移为0
    pub fn new<R: Rng + ?Sized>(in_channels: usize, embd_size: usize, rng: &mut R) -> Self {
        let reduce = (in_channels != embd_size).then(|| {
            (
                PointwiseConv3d::new(in_channels, embd_size, Init::Kaiming, rng),
                BatchNorm3d::new(embd_size),
            )
        });
        Self {
            reduce,
            in_channels,
            embd_size,
        }
    }

    pub const fn is_identity(&self) -> bool {
        self.reduce.is_none()
    }

    pub const fn embd_size(&self) -> usize {
        self.embd_size
    }

    pub fn conv(&self) -> Option<&PointwiseConv3d> {
        self.reduce.as_ref().map(|(conv, _)| conv)
    }

    pub fn batch_norm(&self) -> Option<&BatchNorm3d> {
        self.reduce.as_ref().map(|(_, bn)| bn)
    }

    /// # 参数
    /// - `x`: [N, in_channels, T, H, W]，T·H·W 须为1
    /// - `is_train_mode`: BatchNorm 是否使用批次统计量
    ///
    /// # 返回
    /// 未归一化的嵌入 [N, embd_size]
    pub fn forward(&mut self, x: &Tensor, is_train_mode: bool) -> Result<Tensor, HeadError> {
        if x.dimension() != 5 {
            return Err(HeadError::DimensionMismatch {
                expected: 5,
                got: x.dimension(),
                message: "嵌入投影的输入须为[N, C, T, H, W]".to_string(),
            });
        }
        if x.shape()[1] != self.in_channels {
            let mut expected = x.shape().to_vec();
            expected[1] = self.in_channels;
            return Err(HeadError::shape_mismatch(
                &expected,
                x.shape(),
                "嵌入投影的输入通道数不符",
            ));
        }
        let projected = match &mut self.reduce {
            Some((conv, bn)) => bn.forward(&conv.forward(x)?, is_train_mode)?,
            None => x.clone(),
        };
        flatten(&projected, self.embd_size)
    }
}

impl Module for EmbeddingProjector {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        match &self.reduce {
            Some((conv, bn)) => {
                let mut params = prefixed("conv", conv.named_parameters());
                params.extend(prefixed("bn", bn.named_parameters()));
                params
            }
            None => Vec::new(),
        }
    }

    fn named_buffers(&self) -> Vec<(String, &Tensor)> {
        match &self.reduce {
            Some((_, bn)) => prefixed("bn", bn.named_buffers()),
            None => Vec::new(),
        }
    }
}
