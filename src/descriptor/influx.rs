use crate::descriptor::types::RequestDescriptor;

/// 把 line protocol 的 seed 文件转换为每行一个 POST
///
/// base URL 就是完整的写入地址，"/" 拼接后保持不变
pub fn parse_lines(content: &str, token: Option<&str>) -> Vec<RequestDescriptor> {
    content
        .lines()
        .map(|line| line.trim().trim_end_matches(','))
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut desc = RequestDescriptor::new("POST", "/");
            if let Some(token) = token {
                desc.add_header("Authorization", &format!("Token {}", token));
            }
            desc.add_header("Content-Type", "text/plain; charset=utf-8");
            desc.body = Some(serde_json::Value::String(line.to_string()));
            desc
        })
        .collect()
}
