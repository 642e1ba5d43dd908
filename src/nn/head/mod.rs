/*
 * @Author       : 老董
 * @Date         : 2026-10-12
 * @Description  : 分类头
 *
 * 数据流（嵌入模式）：
 *   特征挤压 → (dropout) → 嵌入投影 → 归一化 → [类中心混合] → [测地线采样] → 角度打分
 * 非嵌入模式：
 *   特征挤压 → (dropout) → 展平 → Linear 打分
 */

mod cls_head;
mod config;
mod mixing;
mod projector;
mod sampling;
mod slowfast_head;
mod squash;

pub use cls_head::{ClsHead, HeadOutput};
pub use config::{ExtraLossConfig, HeadConfig, LossConfig, SlowFastHeadConfig};
pub use mixing::{ClassMixer, draw_negative_classes};
pub use projector::EmbeddingProjector;
pub use sampling::{AngularStd, GeodesicSampler};
pub use slowfast_head::SlowFastHead;
pub use squash::{FeatureSquasher, flatten};

use crate::nn::layer::{AngleMultipleLinear, Linear};
use crate::nn::loss::LossMap;
use crate::nn::{HeadError, Module};
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;


// ==================== 打分层 ====================

#[enum_dispatch]
pub trait Scorer {
    /// 输入 [N, D]，输出每个类别的得分 [N, C]
    fn score(&self, x: &Tensor) -> Result<Tensor, HeadError>;

    /// 打分层自带的正则损失
    fn regularization_losses(&self, name: &str) -> LossMap;
}

impl Scorer for AngleMultipleLinear {
    fn score(&self, x: &Tensor) -> Result<Tensor, HeadError> {
        self.forward(x)
    }

    fn regularization_losses(&self, name: &str) -> LossMap {
        self.loss(name)
    }
}

impl Scorer for Linear {
    fn score(&self, x: &Tensor) -> Result<Tensor, HeadError> {
        self.forward(x)
    }

    fn regularization_losses(&self, _name: &str) -> LossMap {
        LossMap::new()
    }
}

/// 嵌入模式下为角度打分层，否则为普通线性层
#[enum_dispatch(Scorer)]
#[derive(Debug, Clone)]
pub enum ScoreLayer {
    AngleMultipleLinear,
    Linear,
}

impl ScoreLayer {
    /// 每个类别的代表中心 [C, D]（未归一化）；普通线性层没有类中心
    pub fn class_centers(&self) -> Option<Tensor> {
        match self {
            Self::AngleMultipleLinear(layer) => Some(layer.class_centers()),
            Self::Linear(_) => None,
        }
    }
}

impl Module for ScoreLayer {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        match self {
            Self::AngleMultipleLinear(layer) => layer.named_parameters(),
            Self::Linear(layer) => layer.named_parameters(),
        }
    }
}
