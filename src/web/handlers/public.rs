use crate::services::pages::{Pages, PopularPanels};
use crate::web::error::{AppError, AppResult};
use crate::web::state::AppState;
use axum::extract::{Path, State};
use axum::response::Html;
use std::sync::Arc;
use tera::Context;

fn make_context(state: &AppState) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx
}

fn insert_panels(ctx: &mut Context, panels: &PopularPanels) {
    ctx.insert("most_popular_posts", &panels.most_popular_posts);
    ctx.insert("popular_tags", &panels.popular_tags);
}

pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let page = Pages::new(&state.db, &state.config).index()?;

    let mut ctx = make_context(&state);
    insert_panels(&mut ctx, &page.panels);
    ctx.insert("page_posts", &page.page_posts);

    let html = state.templates.render("index.html", &ctx)?;
    Ok(Html(html))
}

pub async fn post_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let page = Pages::new(&state.db, &state.config)
        .post_detail(&slug)?
        .ok_or_else(|| AppError::not_found(&state, "No such post was found."))?;

    let mut ctx = make_context(&state);
    insert_panels(&mut ctx, &page.panels);
    ctx.insert("post", &page.post);

    let html = state.templates.render("post-details.html", &ctx)?;
    Ok(Html(html))
}

pub async fn tag_filter(
    State(state): State<Arc<AppState>>,
    Path(tag_title): Path<String>,
) -> AppResult<Html<String>> {
    let page = Pages::new(&state.db, &state.config)
        .tag_filter(&tag_title)?
        .ok_or_else(|| AppError::not_found(&state, "No such tag was found."))?;

    let mut ctx = make_context(&state);
    insert_panels(&mut ctx, &page.panels);
    ctx.insert("tag", &page.tag);
    ctx.insert("posts", &page.posts);

    let html = state.templates.render("posts-list.html", &ctx)?;
    Ok(Html(html))
}

pub async fn contacts(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let mut ctx = make_context(&state);
    ctx.extend(Context::from_serialize(
        Pages::new(&state.db, &state.config).contacts(),
    )?);

    let html = state.templates.render("contacts.html", &ctx)?;
    Ok(Html(html))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn fallback(State(state): State<Arc<AppState>>) -> AppError {
    AppError::not_found(&state, "The page you are looking for does not exist.")
}
