use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use super::see_other;
use crate::auth::csrf;
use crate::auth::session::{role_or_redirect, set_flash};
use crate::errors::{AppError, render};
use crate::models::donation::{self, DonationForm};
use crate::models::user::{self, Role};
use crate::templates_structs::{DonateTemplate, PageContext};

#[derive(Deserialize)]
pub struct DonateQuery {
    pub ngo_id: Option<i64>,
}

pub async fn donate_form(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<DonateQuery>,
) -> Result<HttpResponse, AppError> {
    if let Err(resp) = role_or_redirect(&session, Role::Donor) {
        return Ok(resp);
    }
    let ngos = user::search_ngos(&pool, "", None, None).await?;
    let tmpl = DonateTemplate {
        ctx: PageContext::build(&session, "/donor/donate"),
        ngos,
        selected_ngo: query.ngo_id.unwrap_or(0),
        amount: String::new(),
        note: String::new(),
        errors: vec![],
    };
    render(tmpl)
}

pub async fn donate_submit(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<DonationForm>,
) -> Result<HttpResponse, AppError> {
    let me = match role_or_redirect(&session, Role::Donor) {
        Ok(u) => u,
        Err(resp) => return Ok(resp),
    };
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let Some(donor) = user::find_donor_by_user(&pool, me.id).await? else {
        set_flash(&session, "Donor profile not found.");
        return Ok(see_other("/"));
    };

    let mut result = donation::validate_form(&form);
    if user::find_ngo_by_id(&pool, form.ngo_id).await?.is_none() {
        let mut errors = result.err().unwrap_or_default();
        errors.push("Choose an organisation to support".to_string());
        result = Err(errors);
    }

    let amount = match result {
        Ok(a) => a,
        Err(errors) => {
            let ngos = user::search_ngos(&pool, "", None, None).await?;
            let tmpl = DonateTemplate {
                ctx: PageContext::build(&session, "/donor/donate"),
                ngos,
                selected_ngo: form.ngo_id,
                amount: form.amount.clone(),
                note: form.note.clone(),
                errors,
            };
            return render(tmpl);
        }
    };

    let saved = donation::record(&pool, donor.id, form.ngo_id, amount, form.note.trim()).await?;
    log::info!("Donor {} gave {} to NGO {} (donation {})", donor.id, saved.amount, saved.ngo_id, saved.id);
    set_flash(&session, &format!("Thank you! Your donation of {} was recorded.", saved.amount));
    Ok(see_other("/donor/dashboard"))
}
