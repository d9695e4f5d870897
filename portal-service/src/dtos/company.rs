use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "nome é obrigatório"))]
    pub name: String,
    #[serde(rename = "localizacao", default)]
    pub location: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyRequest {
    #[serde(rename = "nome", default)]
    #[validate(length(min = 1, message = "nome não pode ser vazio"))]
    pub name: Option<String>,
    #[serde(rename = "localizacao", default)]
    pub location: Option<String>,
}
