use leptos::prelude::*;

use crate::db::models::PopulatedQuestion;

#[server]
pub async fn list_questions() -> Result<Vec<PopulatedQuestion>, ServerFnError> {
    use crate::actions::question::get_questions;
    use crate::state::AppState;

    let state = use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;

    get_questions(&state.repos)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// All questions, newest first.
#[component]
pub fn QuestionList() -> impl IntoView {
    let questions = Resource::new(|| (), |_| list_questions());

    view! {
        <Suspense fallback=|| view! { <p>"Loading questions..."</p> }>
            {move || questions.get().map(|res| match res {
                Ok(questions) if questions.is_empty() => {
                    view! { <p class="empty">"There are no questions yet."</p> }.into_any()
                }
                Ok(questions) => view! {
                    <ul class="question-list">
                        {questions.into_iter().map(|q| view! { <QuestionCard question=q/> }).collect_view()}
                    </ul>
                }.into_any(),
                Err(e) => view! { <p class="error">"Error: " {e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn QuestionCard(question: PopulatedQuestion) -> impl IntoView {
    let author = question.author.map(|author| {
        let href = format!("/profile/{}", author.clerk_id);
        view! { <a class="author" href=href>{author.name}</a> }
    });

    view! {
        <li class="question-card">
            <a class="question-title" href=format!("/question/{}", question.id.to_hex())>
                {question.title}
            </a>
            <div class="tags">
                {question.tags.into_iter().map(|tag| view! { <span class="tag">{tag.name}</span> }).collect_view()}
            </div>
            {author}
            <span class="metric">{question.upvotes.len()} " votes"</span>
            <span class="metric">{question.answers.len()} " answers"</span>
            <span class="metric">{question.views} " views"</span>
        </li>
    }
}
