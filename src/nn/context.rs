/*
 * @Author       : 老董
 * @Date         : 2026-10-09
 * @Description  : 运行上下文：train/eval 模式、no_grad 作用域、可复现的随机数源
 *
 * 分类头内部所有随机抽样（丢弃掩码、负类下标、混合系数、随机方向、旋转角度）
 * 都只能在 no_grad 作用域内进行：作用域是拿到随机数生成器的唯一途径，
 * 因此这些抽样结果对外部自动微分引擎而言一律是常量。
 */

use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 一次前向/损失计算所处的上下文
///
/// # 使用示例
/// ```ignore
/// let mut ctx = Context::new_with_seed(42);
/// ctx.set_train_mode();
/// let noise = ctx.no_grad_scope(|scope| scope.normal(&[4, 8]));
/// assert!(ctx.is_grad_enabled());
/// ```
#[derive(Debug)]
pub struct Context {
    is_eval_mode: bool,
    is_grad_enabled: bool,
    rng: StdRng,
}

impl Context {
    /// 创建训练模式的上下文，随机数源用系统熵初始化
    pub fn new() -> Self {
        Self {
            is_eval_mode: false,
            is_grad_enabled: true,
            rng: StdRng::from_entropy(),
        }
    }

    /// 创建带种子的上下文，确保所有随机抽样可重放
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            is_eval_mode: false,
            is_grad_enabled: true,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 重置随机数源的种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub const fn set_train_mode(&mut self) {
        self.is_eval_mode = false;
    }

    pub const fn set_eval_mode(&mut self) {
        self.is_eval_mode = true;
    }

    pub const fn is_train_mode(&self) -> bool {
        !self.is_eval_mode
    }

    pub const fn is_grad_enabled(&self) -> bool {
        self.is_grad_enabled
    }

    /// no_grad 上下文
    ///
    /// 进入时关闭梯度记录，`f`返回（或panic展开）时由守卫的`Drop`恢复原状态。
    pub fn no_grad_scope<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut NoGradScope<'_>) -> R,
    {
        let mut scope = NoGradScope::enter(self);
        f(&mut scope)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// no_grad 作用域守卫，持有期间梯度记录处于关闭状态
pub struct NoGradScope<'a> {
    ctx: &'a mut Context,
    was_grad_enabled: bool,
}

impl<'a> NoGradScope<'a> {
    fn enter(ctx: &'a mut Context) -> Self {
        let was_grad_enabled = ctx.is_grad_enabled;
        ctx.is_grad_enabled = false;
        Self {
            ctx,
            was_grad_enabled,
        }
    }

    pub fn is_grad_enabled(&self) -> bool {
        self.ctx.is_grad_enabled
    }

    pub fn is_train_mode(&self) -> bool {
        self.ctx.is_train_mode()
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.ctx.rng
    }

    /// 标准正态分布张量
    pub fn normal(&mut self, shape: &[usize]) -> Tensor {
        Tensor::normal_with_rng(0., 1., shape, &mut self.ctx.rng)
    }

    /// [0, 1)上的均匀分布张量
    pub fn uniform(&mut self, shape: &[usize]) -> Tensor {
        Tensor::uniform_with_rng(0., 1., shape, &mut self.ctx.rng)
    }

    /// `count`个落在[0, high)内的均匀随机整数
    ///
    /// # Panics
    /// `high`为0时
    pub fn randint(&mut self, high: usize, count: usize) -> Vec<usize> {
        (0..count).map(|_| self.ctx.rng.gen_range(0..high)).collect()
    }
}

impl Drop for NoGradScope<'_> {
    fn drop(&mut self) {
        self.ctx.is_grad_enabled = self.was_grad_enabled;
    }
}
