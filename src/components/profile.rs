use chrono::{DateTime, Utc};
use leptos::prelude::*;
use leptos_router::hooks::{use_params_map, use_query_map};
use serde::{Deserialize, Serialize};

use crate::db::models::{Answer, Page, Question, UserInfo};

/// What the profile page needs from the server in one round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub info: UserInfo,
    /// Whether the viewer is looking at their own profile.
    pub is_owner: bool,
}

/// "Joined March 2024"
pub fn format_joined_date(joined_at: &DateTime<Utc>) -> String {
    format!("Joined {}", joined_at.format("%B %Y"))
}

/// The `page` query parameter as a 1-based page number.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .map(|p| p as u64)
        .unwrap_or(1)
}

#[server]
pub async fn get_profile(clerk_id: String) -> Result<ProfileData, ServerFnError> {
    use crate::actions::user::get_user_info;
    use crate::auth::{is_profile_owner, viewer_from_headers};
    use crate::state::AppState;

    let state = use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    let headers: axum::http::HeaderMap = leptos_axum::extract().await?;
    let viewer = viewer_from_headers(&headers, &state.config.identity_header);

    let info = get_user_info(&state.repos, &clerk_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    let is_owner = is_profile_owner(viewer.as_deref(), &info.user.clerk_id);

    Ok(ProfileData { info, is_owner })
}

#[server]
pub async fn fetch_user_questions(
    author_id: String,
    page: u64,
) -> Result<Page<Question>, ServerFnError> {
    use crate::actions::user::get_user_questions;
    use crate::api::questions::parse_object_id;
    use crate::state::AppState;

    let state = use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    let author = parse_object_id("user id", &author_id)
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    get_user_questions(&state.repos, author, page, state.config.page_size)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[server]
pub async fn fetch_user_answers(
    author_id: String,
    page: u64,
) -> Result<Page<Answer>, ServerFnError> {
    use crate::actions::user::get_user_answers;
    use crate::api::questions::parse_object_id;
    use crate::state::AppState;

    let state = use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    let author = parse_object_id("user id", &author_id)
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    get_user_answers(&state.repos, author, page, state.config.page_size)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileTab {
    TopPosts,
    Answers,
}

/// `/profile/:id`, where `:id` is the user's external identity id.
#[component]
pub fn ProfilePage() -> impl IntoView {
    let params = use_params_map();
    let query = use_query_map();
    let clerk_id = Memo::new(move |_| params.read().get("id").unwrap_or_default());
    let page = Memo::new(move |_| parse_page(query.read().get("page").as_deref()));

    let profile = Resource::new(move || clerk_id.get(), get_profile);

    view! {
        <Suspense fallback=|| view! { <p>"Loading profile..."</p> }>
            {move || profile.get().map(|res| match res {
                Ok(data) => view! { <ProfileView data=data page=page /> }.into_any(),
                Err(e) => view! { <p class="error">"Error loading profile: " {e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn ProfileView(data: ProfileData, page: Memo<u64>) -> impl IntoView {
    let ProfileData { info, is_owner } = data;
    let user = info.user;
    let author_id = user.id.to_hex();
    let tab = RwSignal::new(ProfileTab::TopPosts);

    let edit_link = is_owner.then(|| {
        let href = format!("/profile/edit/{}", user.clerk_id);
        view! { <a class="btn-secondary" href=href>"Edit profile"</a> }
    });

    view! {
        <div class="profile-header">
            <div class="profile-identity">
                <img class="profile-picture" src=user.picture.clone() alt="profile" width="140" height="140"/>
                <div>
                    <h2>{user.name.clone()}</h2>
                    <p>"@" {user.username.clone()}</p>
                    <div class="profile-links">
                        {user.portfolio_website.clone().map(|url| view! {
                            <ProfileLink img_url="/assets/icons/link.svg" href=url title="Portfolio".to_string()/>
                        })}
                        {user.location.clone().map(|location| view! {
                            <ProfileLink img_url="/assets/icons/location.svg" title=location/>
                        })}
                        <ProfileLink img_url="/assets/icons/calendar.svg" title=format_joined_date(&user.joined_at)/>
                    </div>
                    {user.bio.clone().map(|bio| view! { <p class="profile-bio">{bio}</p> })}
                </div>
            </div>
            <div class="profile-actions">{edit_link}</div>
        </div>

        <Stats total_questions=info.total_questions total_answers=info.total_answers/>

        <div class="tabs">
            <div class="tab-list">
                <button
                    class="tab"
                    class:active=move || tab.get() == ProfileTab::TopPosts
                    on:click=move |_| tab.set(ProfileTab::TopPosts)
                >
                    "Top Posts"
                </button>
                <button
                    class="tab"
                    class:active=move || tab.get() == ProfileTab::Answers
                    on:click=move |_| tab.set(ProfileTab::Answers)
                >
                    "Answers"
                </button>
            </div>
            {move || match tab.get() {
                ProfileTab::TopPosts => view! { <QuestionTab author_id=author_id.clone() page=page/> }.into_any(),
                ProfileTab::Answers => view! { <AnswersTab author_id=author_id.clone() page=page/> }.into_any(),
            }}
        </div>
    }
}

#[component]
pub fn ProfileLink(
    img_url: &'static str,
    #[prop(optional, into)] href: Option<String>,
    title: String,
) -> impl IntoView {
    view! {
        <div class="profile-link">
            <img src=img_url alt="icon" width="20" height="20"/>
            {match href {
                Some(href) => view! { <a href=href target="_blank" rel="noopener">{title}</a> }.into_any(),
                None => view! { <span>{title}</span> }.into_any(),
            }}
        </div>
    }
}

#[component]
pub fn Stats(total_questions: u64, total_answers: u64) -> impl IntoView {
    view! {
        <div class="stats">
            <h4>"Stats"</h4>
            <div class="stats-grid">
                <div class="stat">
                    <p>{total_questions}</p>
                    <p>"Questions"</p>
                </div>
                <div class="stat">
                    <p>{total_answers}</p>
                    <p>"Answers"</p>
                </div>
            </div>
        </div>
    }
}

#[component]
fn QuestionTab(author_id: String, page: Memo<u64>) -> impl IntoView {
    let questions = Resource::new(
        move || (author_id.clone(), page.get()),
        |(author_id, page)| fetch_user_questions(author_id, page),
    );

    view! {
        <Suspense fallback=|| view! { <p>"Loading questions..."</p> }>
            {move || questions.get().map(|res| match res {
                Ok(result) => view! {
                    <ul class="question-list">
                        {result.items.into_iter().map(|q| view! {
                            <li class="question-card">
                                <a href=format!("/question/{}", q.id.to_hex())>{q.title}</a>
                                <span class="metric">{q.views} " views"</span>
                                <span class="metric">{q.upvotes.len()} " votes"</span>
                                <span class="metric">{q.answers.len()} " answers"</span>
                            </li>
                        }).collect_view()}
                    </ul>
                    <Pagination page=page.get() is_next=result.is_next/>
                }.into_any(),
                Err(e) => view! { <p class="error">"Error: " {e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn AnswersTab(author_id: String, page: Memo<u64>) -> impl IntoView {
    let answers = Resource::new(
        move || (author_id.clone(), page.get()),
        |(author_id, page)| fetch_user_answers(author_id, page),
    );

    view! {
        <Suspense fallback=|| view! { <p>"Loading answers..."</p> }>
            {move || answers.get().map(|res| match res {
                Ok(result) => view! {
                    <ul class="answer-list">
                        {result.items.into_iter().map(|a| view! {
                            <li class="answer-card">
                                <a href=format!("/question/{}#{}", a.question.to_hex(), a.id.to_hex())>
                                    {a.content}
                                </a>
                                <span class="metric">{a.upvotes.len()} " votes"</span>
                            </li>
                        }).collect_view()}
                    </ul>
                    <Pagination page=page.get() is_next=result.is_next/>
                }.into_any(),
                Err(e) => view! { <p class="error">"Error: " {e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn Pagination(page: u64, is_next: bool) -> impl IntoView {
    let prev = (page > 1).then(|| {
        view! { <a class="pagination-prev" href=format!("?page={}", page - 1)>"Prev"</a> }
    });
    let next = is_next.then(|| {
        view! { <a class="pagination-next" href=format!("?page={}", page + 1)>"Next"</a> }
    });

    view! {
        <div class="pagination">
            {prev}
            <span class="pagination-current">{page}</span>
            {next}
        </div>
    }
}
