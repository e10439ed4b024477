use serde::Deserialize;
use validator::ValidateEmail;

use crate::domain::types::ClientId;
use crate::domain::user::UpdateUser;
use crate::forms::{FormError, non_blank};

/// Token handed over by the browser after the identity provider signed the user in.
#[derive(Debug, Deserialize)]
pub struct SessionForm {
    pub token: String,
}

/// Body of `PUT /auth/me`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub client_id: Option<i32>,
}

impl TryFrom<UpdateProfileForm> for UpdateUser {
    type Error = FormError;

    fn try_from(form: UpdateProfileForm) -> Result<Self, Self::Error> {
        let email = non_blank(form.email).map(|email| email.to_lowercase());
        if let Some(email) = &email
            && !email.validate_email()
        {
            return Err(FormError::InvalidEmail);
        }

        let client_id = form
            .client_id
            .map(ClientId::new)
            .transpose()
            .map_err(|_| FormError::InvalidClientId)?;

        Ok(UpdateUser {
            email,
            name: non_blank(form.name),
            client_id,
            setup_status: None,
        })
    }
}
