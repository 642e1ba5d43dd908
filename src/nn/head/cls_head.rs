/*
 * @Author       : 老董
 * @Date         : 2026-10-13
 * @Description  : ClsHead：带可选超球面嵌入的分类头
 *
 * 嵌入模式下，训练时可对归一化后的嵌入依次施加类中心混合与测地线采样两种随机正则；
 * 推理模式下两者都不生效。所有随机抽样都在 no_grad 作用域内完成。
 */

use super::config::HeadConfig;
use super::mixing::ClassMixer;
use super::projector::EmbeddingProjector;
use super::sampling::{AngularStd, GeodesicSampler};
use super::squash::{FeatureSquasher, flatten};
use super::{ScoreLayer, Scorer};
use crate::nn::layer::{AngleMultipleLinear, Dropout, Linear};
use crate::nn::loss::{AuxLoss, ClassificationLoss, ExtraLoss, HeadLoss, LossMap};
use crate::nn::module::prefixed;
use crate::nn::{Context, HeadError, Init, Module, sphere};
use crate::tensor::Tensor;
use tracing::{debug, info, warn};

/// 一次前向的输出
#[derive(Debug, Clone)]
pub struct HeadOutput {
    /// 打分 [N, num_classes]
    pub scores: Tensor,
    /// 送入打分层的嵌入 [N, embd_size]，仅在嵌入模式且请求附加数据时给出
    pub embedding: Option<Tensor>,
}

#[derive(Debug, Clone)]
pub struct ClsHead {
    config: HeadConfig,
    squasher: FeatureSquasher,
    dropout: Option<Dropout>,
    projector: Option<EmbeddingProjector>,
    scorer: ScoreLayer,
    mixer: Option<ClassMixer>,
    sampler: Option<GeodesicSampler>,
    head_loss: HeadLoss,
    losses_extra: Vec<(String, AuxLoss)>,
}

impl ClsHead {
    /// 校验配置并构造分类头，参数初始化在 no_grad 作用域内用`ctx`的随机数源完成
    pub fn new(config: HeadConfig, ctx: &mut Context) -> Result<Self, HeadError> {
        config.validate()?;
        let head_loss = config.loss_cls.build()?;
        let losses_extra = config
            .losses_extra
            .iter()
            .map(|(name, loss)| (name.clone(), loss.build()))
            .collect();

        let mixer = if config.enable_class_mixing {
            Some(ClassMixer::new(config.class_mixing_alpha, config.num_classes)?)
        } else {
            None
        };
        let sampler = match (config.enable_sampling, config.sampling_angle_std) {
            (true, Some(base_std)) => Some(match &config.class_sizes {
                Some(class_sizes) if config.adaptive_sampling => {
                    GeodesicSampler::adaptive(base_std, config.num_classes, class_sizes)?
                }
                _ => GeodesicSampler::new(base_std)?,
            }),
            _ => None,
        };
        if config.adaptive_sampling && !config.enable_sampling {
            warn!("adaptive_sampling 已设置但未启用采样，该选项不生效");
        }

        let (projector, scorer) = ctx.no_grad_scope(|scope| {
            let rng = scope.rng();
            if config.embedding {
                let projector = EmbeddingProjector::new(config.in_channels, config.embd_size, rng);
                let scorer = AngleMultipleLinear::new(
                    config.embd_size,
                    config.num_classes,
                    config.num_centers,
                    config.st_scale,
                    config.reg_weight,
                    config.reg_threshold,
                    rng,
                );
                (Some(projector), ScoreLayer::from(scorer))
            } else {
                let init = Init::Normal {
                    mean: 0.,
                    std: config.init_std,
                };
                let scorer = Linear::new(config.in_channels, config.num_classes, true, init, rng);
                (None, ScoreLayer::from(scorer))
            }
        });

        info!(
            num_classes = config.num_classes,
            in_channels = config.in_channels,
            embedding = config.embedding,
            embd_size = config.embd_size,
            class_mixing = mixer.is_some(),
            sampling = sampler.is_some(),
            "构造分类头"
        );

        Ok(Self {
            squasher: FeatureSquasher::new(config.spatial_pooling()),
            dropout: (config.dropout_ratio > 0.).then(|| Dropout::new(config.dropout_ratio)),
            projector,
            scorer,
            mixer,
            sampler,
            head_loss,
            losses_extra,
            config,
        })
    }

    /// 前向传播
    ///
    /// # 参数
    /// - `x`: 特征 [N, C, H, W] 或 [N, C, T, H, W]
    /// - `labels`: 标签 [N]，训练模式下启用类中心混合或自适应采样时必需
    /// - `return_extra_data`: 是否一并返回送入打分层的嵌入
    pub fn forward(
        &mut self,
        ctx: &mut Context,
        x: &Tensor,
        labels: Option<&[usize]>,
        return_extra_data: bool,
    ) -> Result<HeadOutput, HeadError> {
        let x = self.squasher.forward(x)?;
        let x = match &self.dropout {
            Some(dropout) => dropout.forward(ctx, &x),
            None => x,
        };

        let Some(projector) = self.projector.as_mut() else {
            let scores = self.scorer.score(&flatten(&x, self.config.in_channels)?)?;
            return Ok(HeadOutput {
                scores,
                embedding: None,
            });
        };

        let unnorm_embd = projector.forward(&x, ctx.is_train_mode())?;
        let mut norm_embd = sphere::normalize(&unnorm_embd, 1);

        if ctx.is_train_mode() {
            if let Some(mixer) = &self.mixer {
                let labels = labels
                    .ok_or_else(|| HeadError::MissingLabels("类中心混合需要标签".to_string()))?;
                let centers = self
                    .scorer
                    .class_centers()
                    .ok_or_else(|| HeadError::invalid_config("类中心混合需要角度打分层"))?;
                norm_embd = mixer.mix(ctx, &norm_embd, labels, &sphere::normalize(&centers, 1))?;
            }
            if let Some(sampler) = &self.sampler {
                norm_embd = sampler.sample(ctx, &norm_embd, labels)?;
            }
        } else {
            debug!("推理模式，跳过嵌入增强");
        }

        let scores = self.scorer.score(&norm_embd)?;
        Ok(HeadOutput {
            scores,
            embedding: return_extra_data.then_some(norm_embd),
        })
    }

    /// 计算损失
    ///
    /// # 参数
    /// - `scores`: `forward`给出的打分 [N, C]
    /// - `labels`: 标签 [N]
    /// - `norm_embd`: `forward`给出的嵌入（传给附加损失，可为 None）
    /// - `name`: 附加在每个键名末尾的后缀
    ///
    /// # 返回
    /// `loss/cls{name}`、可选的`scale/cls{name}`、各附加损失（键名中的`_`换成`/`）
    /// 以及打分层自带的正则项
    pub fn loss(
        &self,
        scores: &Tensor,
        labels: Option<&[usize]>,
        norm_embd: Option<&Tensor>,
        name: &str,
    ) -> Result<LossMap, HeadError> {
        let labels = labels.ok_or_else(|| HeadError::MissingLabels("计算损失需要标签".to_string()))?;
        let mut losses = LossMap::new();

        let cls = self.head_loss.compute(scores, labels)?;
        losses.insert(format!("loss/cls{name}"), cls.value);
        if let Some(scale) = cls.last_scale {
            losses.insert(format!("scale/cls{name}"), Tensor::from(scale));
        }

        for (extra_name, extra_loss) in &self.losses_extra {
            let value = extra_loss.compute(norm_embd, scores, labels)?;
            losses.insert(format!("{}{name}", extra_name.replace('_', "/")), value);
        }

        if self.with_embedding() {
            losses.extend(self.scorer.regularization_losses(name));
        }
        Ok(losses)
    }

    /// 主分类损失所用的尺度
    pub fn last_scale(&self) -> Option<f32> {
        self.head_loss.last_scale()
    }

    pub const fn with_embedding(&self) -> bool {
        self.config.embedding
    }

    pub const fn config(&self) -> &HeadConfig {
        &self.config
    }

    pub const fn score_layer(&self) -> &ScoreLayer {
        &self.scorer
    }

    /// 外部优化器在两次前向之间更新参数时使用
    pub const fn score_layer_mut(&mut self) -> &mut ScoreLayer {
        &mut self.scorer
    }

    pub const fn projector(&self) -> Option<&EmbeddingProjector> {
        self.projector.as_ref()
    }

    /// 测地线采样的角度标准差，未启用采样时为 None
    pub fn sampling_angle_std(&self) -> Option<&AngularStd> {
        self.sampler.as_ref().map(GeodesicSampler::angle_std)
    }
}

impl Module for ClsHead {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params = Vec::new();
        if let Some(projector) = &self.projector {
            params.extend(prefixed("fc_pre_angular", projector.named_parameters()));
        }
        let scorer_name = if self.with_embedding() {
            "fc_angular"
        } else {
            "fc_cls"
        };
        params.extend(prefixed(scorer_name, self.scorer.named_parameters()));
        params
    }

    fn named_buffers(&self) -> Vec<(String, &Tensor)> {
        let mut buffers = Vec::new();
        if let Some(projector) = &self.projector {
            buffers.extend(prefixed("fc_pre_angular", projector.named_buffers()));
        }
        if let Some(AngularStd::PerClass(stds)) = self.sampling_angle_std() {
            buffers.push(("sampling_angle_std".to_string(), stds));
        }
        buffers
    }
}
