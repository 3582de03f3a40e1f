//! S3 URI parsing, spec §6.
//!
//! `s3://<bucket>[/<prefix>]`. Split at the first `/` after the scheme;
//! everything before is the bucket, everything after is the prefix
//! (possibly empty). A trailing `/` in the prefix is preserved verbatim.

use crate::error::S3pdError;

const SCHEME: &str = "s3://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub bucket: String,
    pub prefix: String,
}

pub fn parse_s3_uri(source: &str) -> Result<S3Uri, S3pdError> {
    let Some(rest) = source.strip_prefix(SCHEME) else {
        return Err(S3pdError::Usage(format!(
            "unsupported source URI '{source}': expected s3://<bucket>[/<prefix>]"
        )));
    };

    match rest.split_once('/') {
        Some((bucket, prefix)) => Ok(S3Uri {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        }),
        None => Ok(S3Uri {
            bucket: rest.to_string(),
            prefix: String::new(),
        }),
    }
}
