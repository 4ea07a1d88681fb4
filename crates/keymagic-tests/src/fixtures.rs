//! Response bodies as an EDD store sends them.

use serde_json::{Value, json};

/// `check_license` answer.
pub fn check(status: &str) -> Value {
    json!({
        "success": status == "valid",
        "license": status,
        "item_name": "Awesome Plugin",
        "expires": "2027-01-01 23:59:59",
        "license_limit": 5,
        "site_count": 1,
        "activations_left": 4
    })
}

/// Successful `activate_license` answer.
pub fn activated() -> Value {
    json!({
        "success": true,
        "license": "valid",
        "item_name": "Awesome Plugin",
        "expires": "2027-01-01 23:59:59",
        "activations_left": 4
    })
}

/// Refused `activate_license` answer carrying an error code.
pub fn activation_error(code: &str) -> Value {
    json!({
        "success": false,
        "license": "invalid",
        "item_name": "Awesome Plugin",
        "error": code,
        "expires": "2020-01-01 23:59:59"
    })
}

/// `deactivate_license` answer, `deactivated` or `failed`.
pub fn deactivation(result: &str) -> Value {
    json!({
        "success": result == "deactivated",
        "license": result,
        "item_name": "Awesome Plugin"
    })
}

/// `get_version` answer.
pub fn version(new_version: &str) -> Value {
    json!({
        "new_version": new_version,
        "stable_version": new_version,
        "name": "Awesome Plugin",
        "slug": "awesome-plugin",
        "homepage": "https://store.test/downloads/awesome-plugin",
        "package": "https://store.test/download/awesome-plugin.zip",
        "sections": {
            "description": "Makes things awesome.",
            "changelog": "<p>Faster.</p>"
        }
    })
}
