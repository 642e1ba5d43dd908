/*
 * @Author       : 老董
 * @Date         : 2026-10-09
 * @Description  : 分类头的错误类型
 *
 * 三类错误：
 * - 配置错误：构造时发现，调用方须修正配置后重建
 * - 形状错误：前向时发现，仅影响本次调用
 * - 标签缺失/越界：需要标签的步骤拿不到合法标签，仅影响本次调用
 */

use thiserror::Error;

/// 分类头操作错误类型
#[derive(Error, Debug)]
pub enum HeadError {
    #[error("配置无效：{0}")]
    InvalidConfig(String),
    #[error("{message}：期望形状{expected:?}，实际形状{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("{message}：期望{expected}维，实际{got}维")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        message: String,
    },
    #[error("缺少标签：{0}")]
    MissingLabels(String),
    #[error("标签{label}超出类别范围[0, {num_classes})")]
    LabelOutOfRange { label: usize, num_classes: usize },
    #[error("配置解析失败：{0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("读取配置文件失败：{0}")]
    Io(#[from] std::io::Error),
}

impl HeadError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub(crate) fn shape_mismatch(expected: &[usize], got: &[usize], message: &str) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
            message: message.to_string(),
        }
    }
}

/// 校验标签向量：长度须等于批大小，且每个标签都在[0, num_classes)内
pub(crate) fn check_labels(
    labels: &[usize],
    batch_size: usize,
    num_classes: usize,
) -> Result<(), HeadError> {
    if labels.len() != batch_size {
        return Err(HeadError::shape_mismatch(
            &[batch_size],
            &[labels.len()],
            "标签数与批大小不一致",
        ));
    }
    match labels.iter().find(|&&label| label >= num_classes) {
        Some(&label) => Err(HeadError::LabelOutOfRange { label, num_classes }),
        None => Ok(()),
    }
}
