/*
 * @Author       : 老董
 * @Date         : 2026-10-12
 * @Description  : 分类头的构造期配置（可从 JSON 读取），构造后不可变
 */

use crate::nn::HeadError;
use crate::nn::loss::{AmSoftmaxLoss, AuxLoss, CrossEntropyLoss, HeadLoss, LocalPushLoss};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;
use std::path::Path;

// ==================== 损失配置 ====================

/// 主分类损失配置，以`type`字段区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LossConfig {
    CrossEntropyLoss {
        #[serde(default)]
        label_smoothing: f32,
    },
    AmSoftmaxLoss {
        #[serde(default = "default_am_scale")]
        scale: f32,
        #[serde(default = "default_am_margin")]
        margin: f32,
    },
}

impl Default for LossConfig {
    fn default() -> Self {
        Self::CrossEntropyLoss {
            label_smoothing: 0.,
        }
    }
}

impl LossConfig {
    pub fn build(&self) -> Result<HeadLoss, HeadError> {
        match *self {
            Self::CrossEntropyLoss { label_smoothing } => {
                if !(0. ..1.).contains(&label_smoothing) {
                    return Err(HeadError::invalid_config(format!(
                        "标签平滑系数须在[0, 1)内，实际为{label_smoothing}"
                    )));
                }
                Ok(CrossEntropyLoss::with_label_smoothing(label_smoothing).into())
            }
            Self::AmSoftmaxLoss { scale, margin } => {
                if scale <= 0. || margin < 0. {
                    return Err(HeadError::invalid_config(format!(
                        "AM-Softmax 须满足 scale > 0 且 margin ≥ 0，实际为 scale={scale}, margin={margin}"
                    )));
                }
                Ok(AmSoftmaxLoss::new(scale, margin).into())
            }
        }
    }
}

/// 附加损失配置，以`type`字段区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtraLossConfig {
    LocalPushLoss {
        #[serde(default = "default_push_margin")]
        margin: f32,
        #[serde(default = "default_one")]
        weight: f32,
    },
}

impl ExtraLossConfig {
    pub fn build(&self) -> AuxLoss {
        match *self {
            Self::LocalPushLoss { margin, weight } => LocalPushLoss::new(margin, weight).into(),
        }
    }
}

// ==================== 分类头配置 ====================

/// `ClsHead` 的配置
///
/// # JSON 示例
/// ```ignore
/// {
///     "num_classes": 400, "in_channels": 960,
///     "spatial_type": "avg", "embedding": true, "embd_size": 256,
///     "enable_sampling": true, "sampling_angle_std": 0.349,
///     "adaptive_sampling": true, "class_sizes": {"0": 120, "1": 37},
///     "loss_cls": {"type": "AmSoftmaxLoss", "scale": 30.0, "margin": 0.35},
///     "losses_extra": {"loss_lpush": {"type": "LocalPushLoss", "margin": 0.1}}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadConfig {
    pub num_classes: usize,
    pub in_channels: usize,
    /// `avg` 时做(1,1,1)自适应平均池化，其余（或缺省）不池化
    #[serde(default)]
    pub spatial_type: Option<String>,
    #[serde(default)]
    pub dropout_ratio: f32,
    /// 普通线性打分器的正态初始化标准差
    #[serde(default = "default_init_std")]
    pub init_std: f32,

    #[serde(default)]
    pub embedding: bool,
    #[serde(default = "default_embd_size")]
    pub embd_size: usize,
    #[serde(default = "default_num_centers")]
    pub num_centers: usize,
    #[serde(default = "default_st_scale")]
    pub st_scale: f32,
    #[serde(default = "default_one")]
    pub reg_weight: f32,
    #[serde(default = "default_reg_threshold")]
    pub reg_threshold: f32,

    #[serde(default)]
    pub enable_sampling: bool,
    #[serde(default)]
    pub adaptive_sampling: bool,
    #[serde(default)]
    pub sampling_angle_std: Option<f32>,

    #[serde(default)]
    pub enable_class_mixing: bool,
    #[serde(default = "default_class_mixing_alpha")]
    pub class_mixing_alpha: f32,

    /// 各类别的训练样本数（类别 → 数量），自适应采样时必需
    #[serde(default)]
    pub class_sizes: Option<BTreeMap<usize, usize>>,
    #[serde(default)]
    pub loss_cls: LossConfig,
    #[serde(default)]
    pub losses_extra: BTreeMap<String, ExtraLossConfig>,
}

impl HeadConfig {
    /// 只指定类别数与输入通道数，其余取默认值
    pub fn new(num_classes: usize, in_channels: usize) -> Self {
        Self {
            num_classes,
            in_channels,
            spatial_type: None,
            dropout_ratio: 0.,
            init_std: default_init_std(),
            embedding: false,
            embd_size: default_embd_size(),
            num_centers: default_num_centers(),
            st_scale: default_st_scale(),
            reg_weight: default_one(),
            reg_threshold: default_reg_threshold(),
            enable_sampling: false,
            adaptive_sampling: false,
            sampling_angle_std: None,
            enable_class_mixing: false,
            class_mixing_alpha: default_class_mixing_alpha(),
            class_sizes: None,
            loss_cls: LossConfig::default(),
            losses_extra: BTreeMap::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, HeadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HeadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn spatial_pooling(&self) -> bool {
        self.spatial_type.as_deref() == Some("avg")
    }

    /// 检查所有选项的合法性及相互之间的约束
    pub fn validate(&self) -> Result<(), HeadError> {
        if self.num_classes == 0 {
            return Err(HeadError::invalid_config("类别数须为正"));
        }
        if self.in_channels == 0 {
            return Err(HeadError::invalid_config("输入通道数须为正"));
        }
        if !(0. ..1.).contains(&self.dropout_ratio) {
            return Err(HeadError::invalid_config(format!(
                "丢弃概率须在[0, 1)内，实际为{}",
                self.dropout_ratio
            )));
        }
        if self.embedding {
            if self.embd_size == 0 {
                return Err(HeadError::invalid_config("启用嵌入时嵌入维度须为正"));
            }
            if self.num_centers == 0 {
                return Err(HeadError::invalid_config("每类中心数须为正"));
            }
        } else if self.enable_sampling || self.enable_class_mixing {
            return Err(HeadError::invalid_config(
                "测地线采样与类中心混合只能在嵌入模式下启用",
            ));
        }
        if self.enable_sampling {
            match self.sampling_angle_std {
                Some(std) if std > 0. && std < FRAC_PI_2 => {}
                Some(std) => {
                    return Err(HeadError::invalid_config(format!(
                        "采样角度标准差须在(0, π/2)内，实际为{std}"
                    )));
                }
                None => return Err(HeadError::invalid_config("启用采样时须给出采样角度标准差")),
            }
            if self.embd_size < 2 {
                return Err(HeadError::invalid_config("测地线采样要求嵌入维度至少为2"));
            }
            if self.adaptive_sampling {
                match &self.class_sizes {
                    None => {
                        return Err(HeadError::invalid_config("自适应采样需要各类别的样本数"));
                    }
                    Some(sizes) => {
                        if let Some((class_id, _)) = sizes.iter().find(|(_, count)| **count == 0) {
                            return Err(HeadError::invalid_config(format!(
                                "类别{class_id}的样本数须为正"
                            )));
                        }
                        if let Some(class_id) = sizes.keys().find(|&&id| id >= self.num_classes) {
                            return Err(HeadError::invalid_config(format!(
                                "样本数统计中的类别{class_id}超出类别范围"
                            )));
                        }
                    }
                }
            }
        }
        if self.enable_class_mixing {
            if self.num_classes < 2 {
                return Err(HeadError::invalid_config("类中心混合至少需要2个类别"));
            }
            if !(0. ..1.).contains(&self.class_mixing_alpha) {
                return Err(HeadError::invalid_config(format!(
                    "混合系数须在[0, 1)内，实际为{}",
                    self.class_mixing_alpha
                )));
            }
        }
        Ok(())
    }
}

/// `SlowFastHead` 的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowFastHeadConfig {
    pub num_classes: usize,
    /// 慢、快两路通道数之和
    pub in_channels: usize,
    #[serde(default = "default_spatial_type")]
    pub spatial_type: Option<String>,
    #[serde(default = "default_slowfast_dropout")]
    pub dropout_ratio: f32,
    #[serde(default = "default_init_std")]
    pub init_std: f32,
    #[serde(default)]
    pub loss_cls: LossConfig,
}

impl SlowFastHeadConfig {
    pub fn new(num_classes: usize, in_channels: usize) -> Self {
        Self {
            num_classes,
            in_channels,
            spatial_type: default_spatial_type(),
            dropout_ratio: default_slowfast_dropout(),
            init_std: default_init_std(),
            loss_cls: LossConfig::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, HeadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn spatial_pooling(&self) -> bool {
        self.spatial_type.as_deref() == Some("avg")
    }

    pub fn validate(&self) -> Result<(), HeadError> {
        if self.num_classes == 0 || self.in_channels == 0 {
            return Err(HeadError::invalid_config("类别数与输入通道数须为正"));
        }
        if !(0. ..1.).contains(&self.dropout_ratio) {
            return Err(HeadError::invalid_config(format!(
                "丢弃概率须在[0, 1)内，实际为{}",
                self.dropout_ratio
            )));
        }
        Ok(())
    }
}

// ==================== 默认值 ====================

const fn default_init_std() -> f32 {
    0.01
}

const fn default_embd_size() -> usize {
    128
}

const fn default_num_centers() -> usize {
    1
}

const fn default_st_scale() -> f32 {
    5.0
}

const fn default_one() -> f32 {
    1.0
}

const fn default_reg_threshold() -> f32 {
    0.1
}

const fn default_class_mixing_alpha() -> f32 {
    0.1
}

const fn default_am_scale() -> f32 {
    30.0
}

const fn default_am_margin() -> f32 {
    0.35
}

const fn default_push_margin() -> f32 {
    0.1
}

const fn default_slowfast_dropout() -> f32 {
    0.8
}

fn default_spatial_type() -> Option<String> {
    Some("avg".to_string())
}
