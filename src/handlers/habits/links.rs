use crate::links::{rel, LinkDto, LinkService, Operation};

/// Links attached to a single habit. `fields` is echoed on `self` only.
pub fn habit_links(links: &LinkService, id: &str, fields: Option<&str>) -> Vec<LinkDto> {
    let id = Some(id.to_string());
    vec![
        links.create(
            Operation::GetHabit,
            rel::SELF,
            &[("id", id.clone()), ("fields", fields.map(str::to_string))],
        ),
        links.create(Operation::UpdateHabit, rel::UPDATE, &[("id", id.clone())]),
        links.create(Operation::PartiallyUpdateHabit, rel::PARTIAL_UPDATE, &[("id", id.clone())]),
        links.create(Operation::DeleteHabit, rel::DELETE, &[("id", id.clone())]),
        links.create(Operation::UpsertHabitTags, rel::UPSERT_TAGS, &[("habitId", id)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::ApiVersion;

    #[test]
    fn habit_links_cover_every_action() {
        let links = habit_links(&LinkService::relative(ApiVersion::V1), "h_1", None);
        let summary: Vec<(&str, &str)> = links.iter().map(|l| (l.rel.as_str(), l.method.as_str())).collect();
        assert_eq!(
            summary,
            [
                ("self", "GET"),
                ("update", "PUT"),
                ("partial-update", "PATCH"),
                ("delete", "DELETE"),
                ("upsert-tags", "PUT"),
            ]
        );
        assert_eq!(links[4].href, "/habits/h_1/tags?api-version=1.0");
    }

    #[test]
    fn self_link_keeps_field_selection() {
        let links = habit_links(&LinkService::relative(ApiVersion::V2), "h_1", Some("name"));
        assert_eq!(links[0].href, "/habits/h_1?fields=name&api-version=2.0");
        assert_eq!(links[1].href, "/habits/h_1?api-version=2.0");
    }
}
