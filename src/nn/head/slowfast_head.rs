/*
 * @Author       : 老董
 * @Date         : 2026-10-14
 * @Description  : SlowFastHead：双路（慢/快）特征的分类头
 *
 * 两路特征各自池化后在通道维拼接（慢路在前），经 dropout 后由 Linear 打分。
 * 没有嵌入，也没有任何嵌入增强。
 */

use super::config::SlowFastHeadConfig;
use super::squash::{FeatureSquasher, flatten};
use crate::nn::layer::{Dropout, Linear};
use crate::nn::loss::{ClassificationLoss, HeadLoss, LossMap};
use crate::nn::module::prefixed;
use crate::nn::{Context, HeadError, Init, Module};
use crate::tensor::Tensor;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SlowFastHead {
    config: SlowFastHeadConfig,
    squasher: FeatureSquasher,
    dropout: Option<Dropout>,
    fc_cls: Linear,
    head_loss: HeadLoss,
}

impl SlowFastHead {
    pub fn new(config: SlowFastHeadConfig, ctx: &mut Context) -> Result<Self, HeadError> {
        config.validate()?;
        let head_loss = config.loss_cls.build()?;
        let init = Init::Normal {
            mean: 0.,
            std: config.init_std,
        };
        let fc_cls = ctx.no_grad_scope(|scope| {
            Linear::new(config.in_channels, config.num_classes, true, init, scope.rng())
        });
        info!(
            num_classes = config.num_classes,
            in_channels = config.in_channels,
            "构造双路分类头"
        );
        Ok(Self {
            squasher: FeatureSquasher::new(config.spatial_pooling()),
            dropout: (config.dropout_ratio > 0.).then(|| Dropout::new(config.dropout_ratio)),
            fc_cls,
            head_loss,
            config,
        })
    }

    /// # 参数
    /// - `x_fast`: 快路特征 [N, C_fast, T_f, H, W]
    /// - `x_slow`: 慢路特征 [N, C_slow, T_s, H, W]，`C_slow + C_fast`须等于`in_channels`
    ///
    /// # 返回
    /// 打分 [N, num_classes]
    pub fn forward(
        &self,
        ctx: &mut Context,
        x_fast: &Tensor,
        x_slow: &Tensor,
    ) -> Result<Tensor, HeadError> {
        let x_fast = self.squasher.forward(x_fast)?;
        let x_slow = self.squasher.forward(x_slow)?;
        let (slow_shape, fast_shape) = (x_slow.shape(), x_fast.shape());
        if slow_shape[0] != fast_shape[0] || slow_shape[2..] != fast_shape[2..] {
            return Err(HeadError::shape_mismatch(
                slow_shape,
                fast_shape,
                "慢、快两路特征的批大小与时空尺寸须一致",
            ));
        }
        if slow_shape[1] + fast_shape[1] != self.config.in_channels {
            return Err(HeadError::shape_mismatch(
                &[self.config.in_channels],
                &[slow_shape[1] + fast_shape[1]],
                "慢、快两路通道数之和与配置不符",
            ));
        }

        let x = Tensor::concat(&[&x_slow, &x_fast], 1);
        let x = match &self.dropout {
            Some(dropout) => dropout.forward(ctx, &x),
            None => x,
        };
        self.fc_cls.forward(&flatten(&x, self.config.in_channels)?)
    }

    /// 只有一项`loss/cls{name}`（若主损失带尺度则另有`scale/cls{name}`）
    pub fn loss(
        &self,
        scores: &Tensor,
        labels: Option<&[usize]>,
        name: &str,
    ) -> Result<LossMap, HeadError> {
        let labels = labels.ok_or_else(|| HeadError::MissingLabels("计算损失需要标签".to_string()))?;
        let cls = self.head_loss.compute(scores, labels)?;
        let mut losses = LossMap::new();
        losses.insert(format!("loss/cls{name}"), cls.value);
        if let Some(scale) = cls.last_scale {
            losses.insert(format!("scale/cls{name}"), Tensor::from(scale));
        }
        Ok(losses)
    }

    pub const fn config(&self) -> &SlowFastHeadConfig {
        &self.config
    }

    pub const fn fc_cls(&self) -> &Linear {
        &self.fc_cls
    }
}

impl Module for SlowFastHead {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        prefixed("fc_cls", self.fc_cls.named_parameters())
    }
}
