/*
 * @Author       : 老董
 * @Date         : 2026-10-09
 * @Description  : Module trait 定义
 */

use crate::tensor::Tensor;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - 参数与缓冲区以“名称 → 张量”的形式暴露，交由外部优化器与序列化机制处理
pub trait Module {
    /// 获取所有可训练参数（带层级名称，如`fc_angular.weight`）
    fn named_parameters(&self) -> Vec<(String, &Tensor)>;

    /// 获取所有不可训练的状态（如 BatchNorm 的滑动统计量）
    fn named_buffers(&self) -> Vec<(String, &Tensor)> {
        Vec::new()
    }

    /// 获取所有可训练参数
    fn parameters(&self) -> Vec<&Tensor> {
        self.named_parameters().into_iter().map(|(_, p)| p).collect()
    }

    /// 可训练标量的总数
    fn num_params(&self) -> usize {
        self.parameters().iter().map(|p| p.size()).sum()
    }
}

/// 给子模块的参数名加上前缀
pub(crate) fn prefixed<'a>(
    prefix: &str,
    named: Vec<(String, &'a Tensor)>,
) -> Vec<(String, &'a Tensor)> {
    named
        .into_iter()
        .map(|(name, tensor)| (format!("{prefix}.{name}"), tensor))
        .collect()
}
