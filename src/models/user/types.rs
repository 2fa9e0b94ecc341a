use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::validate;

/// The single role every account carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Ngo,
    Volunteer,
    Donor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ngo => "ngo",
            Role::Volunteer => "volunteer",
            Role::Donor => "donor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ngo" => Some(Role::Ngo),
            "volunteer" => Some(Role::Volunteer),
            "donor" => Some(Role::Donor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Ngo => "NGO",
            Role::Volunteer => "Volunteer",
            Role::Donor => "Donor",
            Role::Admin => "Admin",
        }
    }

    /// Roles a visitor may pick on the registration form.
    pub fn self_registrable(&self) -> bool {
        !matches!(self, Role::Admin)
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Ngo => "/ngo/dashboard",
            Role::Volunteer => "/volunteer/dashboard",
            Role::Donor => "/donor/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }
}

/// Account row, including the password hash. Never handed to templates.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() { self.email.clone() } else { name.to_string() }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown role '{}'", row.role).into()))?;
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
        })
    }
}

/// User listing for the admin screen, without the password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewNgoProfile {
    pub organization_name: String,
    pub description: String,
    pub mission: String,
    pub website: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewVolunteerProfile {
    pub bio: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewDonorProfile {
    pub company_name: String,
}

/// Role-specific profile created alongside the account.
#[derive(Debug, Clone)]
pub enum NewProfile {
    Ngo(NewNgoProfile),
    Volunteer(NewVolunteerProfile),
    Donor(NewDonorProfile),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NgoProfile {
    pub id: i64,
    pub user_id: i64,
    pub organization_name: String,
    pub description: String,
    pub mission: String,
    pub website: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub category: String,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VolunteerProfile {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DonorProfile {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
}

/// Registration form. Role-specific fields are optional and ignored for other roles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub bio: String,
    /// Comma-separated.
    #[serde(default)]
    pub skills: String,
    /// Comma-separated.
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub company_name: String,
    pub csrf_token: String,
}

impl RegisterForm {
    /// Check every field and build the role profile. Collects all messages.
    pub fn validate(&self) -> Result<(Role, NewProfile), Vec<String>> {
        let mut errors = Vec::new();
        errors.extend(validate::validate_email(&self.email));
        errors.extend(validate::validate_password(&self.password));
        errors.extend(validate::validate_required(&self.first_name, "First name", 100));
        errors.extend(validate::validate_optional(&self.last_name, "Last name", 100));
        errors.extend(validate::validate_phone(&self.phone));

        let role = match Role::parse(&self.role) {
            Some(r) if r.self_registrable() => Some(r),
            _ => {
                errors.push("Choose NGO, volunteer or donor".to_string());
                None
            }
        };

        let profile = match role {
            Some(Role::Ngo) => {
                errors.extend(validate::validate_required(&self.organization_name, "Organization name", 200));
                errors.extend(validate::validate_optional(&self.description, "Description", 2000));
                errors.extend(validate::validate_optional(&self.mission, "Mission", 2000));
                errors.extend(validate::validate_optional(&self.website, "Website", 200));
                errors.extend(validate::validate_optional(&self.city, "City", 100));
                errors.extend(validate::validate_optional(&self.category, "Category", 100));
                Some(NewProfile::Ngo(NewNgoProfile {
                    organization_name: self.organization_name.clone(),
                    description: self.description.clone(),
                    mission: self.mission.clone(),
                    website: self.website.clone(),
                    address: self.address.clone(),
                    city: self.city.clone(),
                    state: self.state.clone(),
                    zip_code: self.zip_code.clone(),
                    category: self.category.clone(),
                }))
            }
            Some(Role::Volunteer) => {
                errors.extend(validate::validate_optional(&self.bio, "Bio", 2000));
                Some(NewProfile::Volunteer(NewVolunteerProfile {
                    bio: self.bio.clone(),
                    skills: validate::parse_tags(&self.skills),
                    interests: validate::parse_tags(&self.interests),
                }))
            }
            Some(Role::Donor) => {
                errors.extend(validate::validate_optional(&self.company_name, "Company name", 200));
                Some(NewProfile::Donor(NewDonorProfile { company_name: self.company_name.clone() }))
            }
            Some(Role::Admin) | None => None,
        };

        match (role, profile) {
            (Some(role), Some(profile)) if errors.is_empty() => Ok((role, profile)),
            _ => Err(errors),
        }
    }
}
