use serde::Deserialize;

use super::{check_length, UpdateSchema, Validate};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAuth {
    pub username: String,
    pub password: String,
}

impl Validate for UserAuth {
    fn validate(&self, errors: &mut Vec<String>) {
        check_length(errors, "username", &self.username, 1, Some(25));
        check_length(errors, "password", &self.password, 1, None);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserRegister {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Validate for UserRegister {
    fn validate(&self, errors: &mut Vec<String>) {
        check_length(errors, "username", &self.username, 1, Some(25));
        check_length(errors, "password", &self.password, 5, Some(20));
        check_length(errors, "firstName", &self.first_name, 1, Some(30));
        check_length(errors, "lastName", &self.last_name, 1, Some(30));
        check_email(errors, &self.email);
    }
}

/// Admin-created user; may grant admin rights.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserNew {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Validate for UserNew {
    fn validate(&self, errors: &mut Vec<String>) {
        self.as_register().validate(errors);
    }
}

impl UserNew {
    fn as_register(&self) -> UserRegister {
        UserRegister {
            username: self.username.clone(),
            password: self.password.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

impl From<UserRegister> for UserNew {
    fn from(r: UserRegister) -> Self {
        Self {
            username: r.username,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            is_admin: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Only honoured for admin callers; see the users router.
    pub is_admin: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self, errors: &mut Vec<String>) {
        if let Some(password) = &self.password {
            check_length(errors, "password", password, 5, Some(20));
        }
        if let Some(first_name) = &self.first_name {
            check_length(errors, "firstName", first_name, 1, Some(30));
        }
        if let Some(last_name) = &self.last_name {
            check_length(errors, "lastName", last_name, 1, Some(30));
        }
        if let Some(email) = &self.email {
            check_email(errors, email);
        }
    }
}

impl UpdateSchema for UserUpdate {}

fn check_email(errors: &mut Vec<String>, email: &str) {
    check_length(errors, "email", email, 6, Some(60));
    match email.find('@') {
        Some(at) if at > 0 && at < email.len() - 1 => {}
        _ => errors.push("instance.email does not conform to the \"email\" format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{validate_body, validate_update};
    use serde_json::json;

    fn registration() -> serde_json::Value {
        json!({
            "username": "new",
            "firstName": "first",
            "lastName": "last",
            "password": "password",
            "email": "new@email.com",
        })
    }

    #[test]
    fn accepts_registration() {
        let user: UserRegister = validate_body(registration()).unwrap();
        assert_eq!(user.username, "new");
    }

    #[test]
    fn registration_cannot_grant_admin() {
        let mut body = registration();
        body["isAdmin"] = json!(true);
        assert!(validate_body::<UserRegister>(body).is_err());
    }

    #[test]
    fn admin_create_defaults_is_admin_false() {
        let user: UserNew = validate_body(registration()).unwrap();
        assert!(!user.is_admin);
    }

    #[test]
    fn rejects_short_password_and_bad_email() {
        let mut body = registration();
        body["password"] = json!("pw");
        body["email"] = json!("not-an-email");
        let err = validate_body::<UserRegister>(body).unwrap_err();
        let messages = err.to_json()["error"]["message"].as_array().cloned().unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn auth_requires_both_fields() {
        assert!(validate_body::<UserAuth>(json!({ "username": "u1" })).is_err());
    }

    #[test]
    fn update_rejects_username_change() {
        assert!(validate_update::<UserUpdate>(json!({ "username": "u1-new" })).is_err());
        assert!(validate_update::<UserUpdate>(json!({ "isAdmin": "yes" })).is_err());
        assert!(validate_update::<UserUpdate>(json!({ "firstName": "New", "isAdmin": true })).is_ok());
    }
}
