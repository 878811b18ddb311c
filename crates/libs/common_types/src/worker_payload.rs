use serde::{Deserialize, Serialize};

/// Payload of a `process-file` job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFilePayload {
    pub file_id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub user_id: Option<i32>,
}

/// Payload of a `notify-admin` job, published once notes have been stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotifyAdminPayload {
    pub file_id: i32,
    pub filename: String,
    pub original_name: String,
    pub user_id: Option<i32>,
    pub note_type: String,
    pub note_id: i32,
}

/// Payload of a `forward-file` job. Sent as-is to the external webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ForwardFilePayload {
    pub file_id: i32,
    pub file_url: String,
    pub original_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub user_id: Option<i32>,
    /// RFC 3339 upload time.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payloads_carry_file_id_in_camel_case() {
        let payload = ProcessFilePayload {
            file_id: 7,
            filename: "1700000000000_abc.txt".into(),
            original_name: "note.txt".into(),
            file_path: "/srv/uploads/1700000000000_abc.txt".into(),
            file_size: 10,
            file_type: "text/plain".into(),
            user_id: None,
        };

        let value = serde_json::to_value(&payload).ok();

        assert_eq!(
            value,
            Some(json!({
                "fileId": 7,
                "filename": "1700000000000_abc.txt",
                "originalName": "note.txt",
                "filePath": "/srv/uploads/1700000000000_abc.txt",
                "fileSize": 10,
                "fileType": "text/plain",
                "userId": null,
            }))
        );
    }
}
