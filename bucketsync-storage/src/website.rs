//! Static website helpers: bucket policy and website property normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageResult;

/// Bucket policy granting anonymous `s3:GetObject` on every key.
pub fn public_read_policy(bucket: &str) -> StorageResult<String> {
    let policy = serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": "s3:GetObject",
            "Resource": format!("arn:aws:s3:::{bucket}/*"),
        }]
    });
    Ok(serde_json::to_string(&policy)?)
}

/// A website declaration: either a bare switch or a full description.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WebsiteInput {
    Enabled(bool),
    Declaration(WebsiteDeclaration),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteDeclaration {
    pub index_document: Option<String>,
    pub error_document: Option<String>,
    pub redirect_all_requests_to: Option<String>,
    pub routing_rules: Option<Value>,
    pub cors: Option<Value>,
    pub content: Option<Value>,
    pub cloudfront: Option<Value>,
}

/// Website block in the shape infrastructure tooling expects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_all_requests_to: Option<String>,
    /// Always a JSON string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_rules: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<WebsiteBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_rules: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloudfront: Option<Value>,
}

/// Splits a website declaration into the website block and its companions
/// (CORS rules, content, CloudFront settings).
pub fn website_props(input: Option<WebsiteInput>) -> StorageResult<WebsiteProps> {
    let declaration = match input {
        None | Some(WebsiteInput::Enabled(false)) => return Ok(WebsiteProps::default()),
        Some(WebsiteInput::Enabled(true)) => {
            return Ok(WebsiteProps {
                website: Some(WebsiteBlock::default()),
                ..WebsiteProps::default()
            });
        }
        Some(WebsiteInput::Declaration(declaration)) => declaration,
    };

    let routing_rules = match declaration.routing_rules {
        None | Some(Value::Null) => None,
        Some(Value::String(rules)) => Some(rules),
        Some(rules) => Some(serde_json::to_string(&rules)?),
    };

    Ok(WebsiteProps {
        website: Some(WebsiteBlock {
            index_document: declaration.index_document,
            error_document: declaration.error_document,
            redirect_all_requests_to: declaration.redirect_all_requests_to,
            routing_rules,
        }),
        cors_rules: declaration.cors,
        content: declaration.content,
        cloudfront: declaration.cloudfront,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_targets_every_key_in_bucket() {
        let policy: Value = serde_json::from_str(&public_read_policy("site").unwrap()).unwrap();
        assert_eq!(policy["Statement"][0]["Resource"], "arn:aws:s3:::site/*");
        assert_eq!(policy["Statement"][0]["Action"], "s3:GetObject");
    }

    #[test]
    fn disabled_website_yields_empty_props() {
        assert_eq!(website_props(None).unwrap(), WebsiteProps::default());
        assert_eq!(
            website_props(Some(WebsiteInput::Enabled(false))).unwrap(),
            WebsiteProps::default()
        );
    }
}
