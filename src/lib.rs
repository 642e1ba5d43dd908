//! # Angular Head
//!
//! 视频/图像识别模型的分类头：把骨干网络池化后的特征映射为各类别得分，
//! 可选地先投影到单位超球面上的嵌入，再用角度打分层（类中心余弦）打分。
//! 训练时可对嵌入施加两种随机正则：类中心混合与测地线采样。
//!
//! 本库只做前向计算，梯度交由外部的自动微分引擎处理；
//! 所有随机抽样都发生在 [`nn::Context::no_grad_scope`] 之内。
//!

pub mod errors;
pub mod nn;
pub mod tensor;
pub mod utils;
