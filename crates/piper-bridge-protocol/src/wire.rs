//! Unity 文本行协议
//!
//! ```text
//! client → server:  get\n
//! server → client:  {"seq":5,"ts":1.25,"target_deg":[...],"current_deg":[...],"piper_jaw":300}\n
//! ```
//!
//! 解码永远不会失败：任何无法使用的响应都归类为 [`Decoded::NoUpdate`]，
//! 由会话循环根据 [`NoUpdateReason`] 决定断开重连还是继续轮询。

use crate::pose::PoseUpdate;
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use tracing::trace;

/// 轮询请求（ASCII `get` + 换行）
pub const POLL_REQUEST: &[u8] = b"get\n";

/// 写入一次轮询请求并立即 flush
pub fn encode_poll_request<W: Write + ?Sized>(writer: &mut W) -> io::Result<()> {
    writer.write_all(POLL_REQUEST)?;
    writer.flush()
}

/// 本周期没有可用更新的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoUpdateReason {
    /// 连接返回零长度读取
    EndOfStream,
    /// 非 UTF-8 文本
    InvalidUtf8,
    /// 不是合法 JSON
    MalformedJson,
    /// JSON 不是对象
    NotAnObject,
    /// `seq` ≤ 0（含缺失）
    StaleSequence { seq: i64 },
}

impl NoUpdateReason {
    /// 是否来自传输层（而不是响应内容）
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, NoUpdateReason::EndOfStream)
    }
}

impl fmt::Display for NoUpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoUpdateReason::EndOfStream => write!(f, "end of stream"),
            NoUpdateReason::InvalidUtf8 => write!(f, "response is not valid UTF-8"),
            NoUpdateReason::MalformedJson => write!(f, "response is not valid JSON"),
            NoUpdateReason::NotAnObject => write!(f, "response is not a JSON object"),
            NoUpdateReason::StaleSequence { seq } => write!(f, "sequence {} is not positive", seq),
        }
    }
}

/// 解码结果
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Update(PoseUpdate),
    NoUpdate(NoUpdateReason),
}

/// 解码一行响应（可包含结尾的 `\n` / `\r\n`）
///
/// 空输入视为连接结束。
pub fn decode_line(line: &[u8]) -> Decoded {
    if line.is_empty() {
        return Decoded::NoUpdate(NoUpdateReason::EndOfStream);
    }

    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => {
            trace!("Dropping non UTF-8 response: {}", e);
            return Decoded::NoUpdate(NoUpdateReason::InvalidUtf8);
        },
    };

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            trace!("Dropping malformed JSON response: {}", e);
            return Decoded::NoUpdate(NoUpdateReason::MalformedJson);
        },
    };

    let Value::Object(object) = value else {
        return Decoded::NoUpdate(NoUpdateReason::NotAnObject);
    };

    let update = PoseUpdate::from_object(object);
    if update.seq() <= 0 {
        return Decoded::NoUpdate(NoUpdateReason::StaleSequence { seq: update.seq() });
    }

    Decoded::Update(update)
}
