/*
 * @Author       : 老董
 * @Date         : 2026-10-15
 * @Description  : SlowFastHead 测试：双路特征池化拼接后线性打分
 */
use angular_head::assert_err;
use angular_head::nn::head::LossConfig;
use angular_head::nn::{Context, HeadError, Module, SlowFastHead, SlowFastHeadConfig};
use angular_head::tensor::Tensor;

fn stream(batch_size: usize, channels: usize, frames: usize, seed: u64) -> Tensor {
    let mut ctx = Context::new_with_seed(seed);
    ctx.no_grad_scope(|scope| scope.normal(&[batch_size, channels, frames, 2, 2]))
}

#[test]
fn test_slowfast_forward_shapes() -> Result<(), HeadError> {
    let mut ctx = Context::new_with_seed(0);
    let head = SlowFastHead::new(SlowFastHeadConfig::new(10, 12), &mut ctx)?;
    assert_eq!(head.fc_cls().weights().shape(), &[12, 10]);

    // 快路帧数多、通道少；慢路帧数少、通道多
    let x_fast = stream(3, 4, 8, 1);
    let x_slow = stream(3, 8, 2, 2);
    let scores = head.forward(&mut ctx, &x_fast, &x_slow)?;
    assert_eq!(scores.shape(), &[3, 10]);
    Ok(())
}

#[test]
fn test_slowfast_eval_mode_is_deterministic() -> Result<(), HeadError> {
    let mut ctx = Context::new_with_seed(0);
    let head = SlowFastHead::new(SlowFastHeadConfig::new(5, 6), &mut ctx)?;
    ctx.set_eval_mode();
    let x_fast = stream(2, 2, 4, 1);
    let x_slow = stream(2, 4, 1, 2);
    let first = head.forward(&mut ctx, &x_fast, &x_slow)?;
    let second = head.forward(&mut ctx, &x_fast, &x_slow)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_slowfast_training_applies_dropout() -> Result<(), HeadError> {
    let mut ctx = Context::new_with_seed(0);
    let head = SlowFastHead::new(SlowFastHeadConfig::new(5, 6), &mut ctx)?;
    let x_fast = stream(2, 2, 4, 1);
    let x_slow = stream(2, 4, 1, 2);
    let train_scores = head.forward(&mut ctx, &x_fast, &x_slow)?;
    ctx.set_eval_mode();
    let eval_scores = head.forward(&mut ctx, &x_fast, &x_slow)?;
    assert_ne!(train_scores, eval_scores);
    Ok(())
}

#[test]
fn test_slowfast_shape_errors() -> Result<(), HeadError> {
    let mut ctx = Context::new_with_seed(0);
    let head = SlowFastHead::new(SlowFastHeadConfig::new(5, 6), &mut ctx)?;
    assert_err!(
        head.forward(&mut ctx, &stream(2, 2, 4, 1), &stream(2, 5, 1, 2)),
        HeadError::ShapeMismatch([6], [7], "慢、快两路通道数之和与配置不符")
    );
    assert_err!(
        head.forward(&mut ctx, &stream(3, 2, 4, 1), &stream(2, 4, 1, 2)),
        HeadError::ShapeMismatch { .. }
    );
    assert_err!(
        head.forward(&mut ctx, &Tensor::zeros(&[2, 2, 4]), &stream(2, 4, 1, 2)),
        HeadError::DimensionMismatch(5, 3)
    );
    Ok(())
}

#[test]
fn test_slowfast_loss() -> Result<(), HeadError> {
    let mut config = SlowFastHeadConfig::new(4, 6);
    config.dropout_ratio = 0.;
    let mut ctx = Context::new_with_seed(0);
    let head = SlowFastHead::new(config, &mut ctx)?;
    let scores = head.forward(&mut ctx, &stream(2, 2, 4, 1), &stream(2, 4, 1, 2))?;

    let losses = head.loss(&scores, Some(&[0, 3]), "")?;
    assert_eq!(losses.keys().cloned().collect::<Vec<_>>(), vec!["loss/cls"]);
    assert_err!(head.loss(&scores, None, ""), HeadError::MissingLabels(_));

    let mut config = SlowFastHeadConfig::new(4, 6);
    config.loss_cls = LossConfig::AmSoftmaxLoss {
        scale: 16.,
        margin: 0.2,
    };
    let head = SlowFastHead::new(config, &mut ctx)?;
    let losses = head.loss(&Tensor::zeros(&[2, 4]), Some(&[1, 2]), "_sf")?;
    assert_eq!(
        losses.keys().cloned().collect::<Vec<_>>(),
        vec!["loss/cls_sf", "scale/cls_sf"]
    );
    Ok(())
}

#[test]
fn test_slowfast_parameters() -> Result<(), HeadError> {
    let mut ctx = Context::new_with_seed(0);
    let head = SlowFastHead::new(SlowFastHeadConfig::new(10, 12), &mut ctx)?;
    let names = head
        .named_parameters()
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["fc_cls.weight", "fc_cls.bias"]);
    assert_eq!(head.num_params(), 12 * 10 + 10);
    Ok(())
}
