//! News, forum and the academy

use super::format::date;
use super::layout::empty;
use crate::actions::{FormKind, Intent};
use crate::markup::Markup;
use crate::record::Record;
use crate::render::{hook, EventKind};
use crate::state::{AppState, Collection};

fn section(title: &str, body: Markup) -> Markup {
    markup!("<section class=\"glass-card\"><h3>{}</h3>{}</section>", title, body)
}

fn list(records: &[Record], item: impl Fn(&Record) -> Markup) -> Markup {
    markup!(
        "<ul class=\"community-list\">{}</ul>",
        records.iter().map(item).collect::<Markup>()
    )
}

pub fn render(state: &AppState, _param: Option<&str>) -> Markup {
    let news = state.collection(Collection::News);
    let news = if news.is_empty() {
        empty("fa-newspaper", "No news today", "Check back later.")
    } else {
        list(news, |n| {
            markup!(
                "<li><h4>{}</h4><p>{}</p><small>{}</small></li>",
                n.text("title").unwrap_or_default(),
                n.text("summary").unwrap_or_default(),
                n.text("published_at").map(|d| date(&d))
            )
        })
    };

    let posts = state.collection(Collection::ForumPosts);
    let forum_list = if posts.is_empty() {
        empty("fa-people-group", "No discussions yet", "Ask the community a question.")
    } else {
        list(posts, |p| {
            markup!(
                "<li><h4>{}</h4><p>{}</p><small>{} · {}</small></li>",
                p.text("title").unwrap_or_default(),
                p.text("content").unwrap_or_default(),
                p.text("author_name").unwrap_or_else(|| "Farmer".to_string()),
                p.text("created_at").map(|d| date(&d))
            )
        })
    };
    let forum = markup!(
        "<form class=\"forum-form\" {}><input name=\"title\" type=\"text\" placeholder=\"Title\" required><textarea name=\"content\" placeholder=\"Share your question...\" required></textarea><button type=\"submit\" class=\"btn-primary\">Post</button></form>{}",
        hook("forum-form", EventKind::Submit, &Intent::Submit(FormKind::ForumPost)),
        forum_list
    );

    let academy = state.collection(Collection::AcademyContent);
    let academy = if academy.is_empty() {
        empty("fa-graduation-cap", "No lessons yet", "Video lessons are on the way.")
    } else {
        list(academy, |a| {
            markup!(
                "<li><h4>{}</h4><p>{}</p><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Watch</a></li>",
                a.text("title").unwrap_or_default(),
                a.text("description").unwrap_or_default(),
                a.text("video_url").unwrap_or_else(|| "#".to_string())
            )
        })
    };

    markup!(
        "<div class=\"community-grid\">{}{}{}</div>",
        section("Agri news", news),
        section("Kisan forum", forum),
        section("KhetGo academy", academy)
    )
}
