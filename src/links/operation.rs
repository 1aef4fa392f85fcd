/// Every operation a link can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetHabits,
    GetHabit,
    CreateHabit,
    UpdateHabit,
    PartiallyUpdateHabit,
    DeleteHabit,
    UpsertHabitTags,
    DeleteHabitTag,
    GetTags,
    GetTag,
    CreateTag,
    UpdateTag,
    DeleteTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: &'static str,
    /// Path with `{name}` placeholders.
    pub template: &'static str,
    pub path_params: &'static [&'static str],
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::GetHabits,
        Operation::GetHabit,
        Operation::CreateHabit,
        Operation::UpdateHabit,
        Operation::PartiallyUpdateHabit,
        Operation::DeleteHabit,
        Operation::UpsertHabitTags,
        Operation::DeleteHabitTag,
        Operation::GetTags,
        Operation::GetTag,
        Operation::CreateTag,
        Operation::UpdateTag,
        Operation::DeleteTag,
    ];

    pub const fn route(self) -> Route {
        let (method, template, path_params): (_, _, &'static [&'static str]) = match self {
            Operation::GetHabits => ("GET", "/habits", &[]),
            Operation::GetHabit => ("GET", "/habits/{id}", &["id"]),
            Operation::CreateHabit => ("POST", "/habits", &[]),
            Operation::UpdateHabit => ("PUT", "/habits/{id}", &["id"]),
            Operation::PartiallyUpdateHabit => ("PATCH", "/habits/{id}", &["id"]),
            Operation::DeleteHabit => ("DELETE", "/habits/{id}", &["id"]),
            Operation::UpsertHabitTags => ("PUT", "/habits/{habitId}/tags", &["habitId"]),
            Operation::DeleteHabitTag => ("DELETE", "/habits/{habitId}/tags/{tagId}", &["habitId", "tagId"]),
            Operation::GetTags => ("GET", "/tags", &[]),
            Operation::GetTag => ("GET", "/tags/{id}", &["id"]),
            Operation::CreateTag => ("POST", "/tags", &[]),
            Operation::UpdateTag => ("PUT", "/tags/{id}", &["id"]),
            Operation::DeleteTag => ("DELETE", "/tags/{id}", &["id"]),
        };

        Route { method, template, path_params }
    }

    pub const fn method(self) -> &'static str {
        self.route().method
    }
}
