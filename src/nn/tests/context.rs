/*
 * @Author       : 老董
 * @Date         : 2026-10-14
 * @Description  : Context（train/eval 模式、no_grad 作用域、随机数源）单元测试
 */

use crate::nn::Context;

#[test]
fn test_default_mode() {
    let ctx = Context::new();
    assert!(ctx.is_train_mode());
    assert!(ctx.is_grad_enabled());
}

#[test]
fn test_mode_switch() {
    let mut ctx = Context::new_with_seed(0);
    ctx.set_eval_mode();
    assert!(!ctx.is_train_mode());
    ctx.set_train_mode();
    assert!(ctx.is_train_mode());
}

#[test]
fn test_no_grad_scope_restores_flag() {
    let mut ctx = Context::new_with_seed(0);
    let inside = ctx.no_grad_scope(|scope| scope.is_grad_enabled());
    assert!(!inside);
    assert!(ctx.is_grad_enabled());
}

#[test]
fn test_no_grad_scope_keeps_mode() {
    let mut ctx = Context::new_with_seed(0);
    ctx.set_eval_mode();
    assert!(!ctx.no_grad_scope(|scope| scope.is_train_mode()));
}

#[test]
fn test_no_grad_scope_restores_flag_on_panic() {
    let mut ctx = Context::new_with_seed(0);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _: () = ctx.no_grad_scope(|_| panic!("作用域内出错"));
    }));
    assert!(result.is_err());
    assert!(ctx.is_grad_enabled());
}

#[test]
fn test_seeded_draws_are_reproducible() {
    let mut ctx1 = Context::new_with_seed(42);
    let mut ctx2 = Context::new_with_seed(42);
    let a = ctx1.no_grad_scope(|scope| scope.normal(&[3, 4]));
    let b = ctx2.no_grad_scope(|scope| scope.normal(&[3, 4]));
    assert_eq!(a, b);

    // 重置种子后重放同一序列
    ctx1.set_seed(42);
    let c = ctx1.no_grad_scope(|scope| scope.normal(&[3, 4]));
    assert_eq!(a, c);
}

#[test]
fn test_randint_and_uniform_ranges() {
    let mut ctx = Context::new_with_seed(7);
    let (ints, uniform) = ctx.no_grad_scope(|scope| (scope.randint(4, 1000), scope.uniform(&[1000])));
    assert_eq!(ints.len(), 1000);
    assert!(ints.iter().all(|&i| i < 4));
    for value in 0..4 {
        assert!(ints.contains(&value));
    }
    assert!(uniform.to_vec().iter().all(|u| (0. ..1.).contains(u)));
}
