use crate::descriptor::{MultiMap, RequestDescriptor};
use crate::{ReseedError, Result};

const FORMAT_ERROR: &str = "exclude_header incorrect format parameter";

/// 命令行传入的额外 header，格式 `key:value,key:value`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRules {
    pairs: Vec<(String, String)>,
}

impl HeaderRules {
    /// 解析并校验规则字符串，空字符串表示没有规则
    pub fn parse(rule: &str) -> Result<Self> {
        if rule.is_empty() {
            return Ok(Self::default());
        }

        let pairs = rule
            .split(',')
            .map(parse_pair)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ReseedError::configuration(FORMAT_ERROR))?;

        Ok(Self { pairs })
    }

    /// 把每一对追加到 `headers`，已有的值保留
    pub fn apply(&self, headers: &mut MultiMap) {
        for (key, value) in &self.pairs {
            headers.entry(key.clone()).or_default().push(value.clone());
        }
    }
}

/// `key:value`，key 只能是 header token 字符，value 非空
fn parse_pair(pair: &str) -> Option<(String, String)> {
    let (key, value) = pair.split_once(':')?;
    let key_ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let value_ok = !value.is_empty() && !value.starts_with(char::is_whitespace);

    (key_ok && value_ok && !value.ends_with(char::is_whitespace))
        .then(|| (key.to_string(), value.to_string()))
}

/// 校验 `rule` 并合并到描述的 header 中
pub fn apply_exclusions(desc: &mut RequestDescriptor, rule: &str) -> Result<()> {
    HeaderRules::parse(rule)?.apply(&mut desc.headers);
    Ok(())
}
