/*
 * @Author       : 老董
 * @Date         : 2026-10-10
 * @Description  : Dropout 层（inverted dropout），只在训练模式下生效
 */

use crate::nn::Context;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy)]
pub struct Dropout {
    p: f32,
}

impl Dropout {
    /// # Panics
    /// `p`不在[0, 1)内时
    pub fn new(p: f32) -> Self {
        assert!((0. ..1.).contains(&p), "丢弃概率须在[0, 1)内，实际为{p}");
        Self { p }
    }

    pub const fn p(&self) -> f32 {
        self.p
    }

    /// 训练模式下以概率`p`将元素置零，并把保留的元素放大`1/(1-p)`；推理模式下原样返回
    pub fn forward(&self, ctx: &mut Context, x: &Tensor) -> Tensor {
        if !ctx.is_train_mode() || self.p == 0. {
            return x.clone();
        }
        let keep_prob = 1. - self.p;
        let p = self.p;
        let mask = ctx.no_grad_scope(|scope| {
            scope
                .uniform(x.shape())
                .map(|u| if u >= p { 1. / keep_prob } else { 0. })
        });
        x * &mask
    }
}
