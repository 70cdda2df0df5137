use entity::{EmployeeRecord, NewEmployee, YesNo};
use platform_db::{DatabaseSettings, Store};
use products_hr::{
    HrError, HrModule, Notice,
    analytics::DepartmentFilter,
    queries::PerformanceAttrition,
};
use uuid::Uuid;

async fn seeded_module() -> HrModule {
    let path = std::env::temp_dir()
        .join("products-hr-tests")
        .join(format!("{}.db", Uuid::new_v4().simple()));
    let store = Store::new(DatabaseSettings::new(path, "employees").unwrap());

    store
        .execute(
            r#"
            CREATE TABLE employees (
                "EmployeeID" INTEGER,
                "Age" INTEGER,
                "Department" TEXT,
                "JobRole" TEXT,
                "PerformanceRating" INTEGER,
                "OverTime" TEXT,
                "MonthlyIncome" INTEGER,
                "Attrition" TEXT
            )
            "#,
            vec![],
        )
        .await
        .unwrap();
    store
        .execute(
            r#"CREATE UNIQUE INDEX employees_employee_id_key ON employees ("EmployeeID")"#,
            vec![],
        )
        .await
        .unwrap();
    store
        .execute(
            r#"
            INSERT INTO employees VALUES
                (1, 41, 'Sales', 'Sales Executive', 3, 'Yes', 5993, 'Yes'),
                (2, 49, 'Research & Development', 'Research Scientist', 4, 'No', 5130, 'No'),
                (4, 37, 'Research & Development', 'Laboratory Technician', 3, 'Yes', 2090, 'Yes'),
                (5, 33, 'Sales', 'Sales Executive', NULL, 'Yes', 2909, 'No'),
                (7, 27, 'Human Resources', 'Human Resources', 4, 'No', 3468, 'No')
            "#,
            vec![],
        )
        .await
        .unwrap();
    HrModule::new(store)
}

fn hire(employee_id: i64) -> NewEmployee {
    NewEmployee {
        employee_id,
        department: "Sales".into(),
        job_role: "Sales Representative".into(),
        performance_rating: 3,
        over_time: YesNo::No,
        monthly_income: 2500,
    }
}

#[tokio::test]
async fn view_for_all_departments_covers_every_row() {
    let hr = seeded_module().await;
    let view = hr.view(DepartmentFilter::All).await.unwrap();

    assert_eq!(view.kpis.headcount, 5);
    assert_eq!(view.kpis.average_monthly_income, 3918);
    assert_eq!(view.kpis.attrition_rate, 40.0);
    assert_eq!(
        view.departments,
        vec!["Human Resources", "Research & Development", "Sales"]
    );
    let ids: Vec<i64> = view.employees.iter().map(|e| e.employee_id).collect();
    assert_eq!(ids, vec![1, 2, 4, 5, 7]);
    assert_eq!(
        view.performance_vs_attrition,
        vec![
            PerformanceAttrition { performance_rating: 3, attrition: Some(YesNo::Yes), count: 2 },
            PerformanceAttrition { performance_rating: 4, attrition: Some(YesNo::No), count: 2 },
        ]
    );
}

#[tokio::test]
async fn department_filter_applies_to_kpis_and_cross_tab() {
    let hr = seeded_module().await;
    let view = hr.view(DepartmentFilter::parse("Sales")).await.unwrap();

    assert_eq!(view.kpis.headcount, 2);
    assert_eq!(view.kpis.attrition_rate, 50.0);
    assert_eq!(view.departments.len(), 3);
    assert_eq!(
        view.performance_vs_attrition,
        vec![PerformanceAttrition {
            performance_rating: 3,
            attrition: Some(YesNo::Yes),
            count: 1,
        }]
    );
    let overtime = &view.attrition_by_overtime;
    assert_eq!(overtime.len(), 1);
    assert_eq!(overtime[0].over_time, YesNo::Yes);
    assert_eq!(overtime[0].attrition_rate, 50.0);
}

#[tokio::test]
async fn unknown_department_yields_an_empty_view() {
    let hr = seeded_module().await;
    let view = hr.view(DepartmentFilter::parse("Legal")).await.unwrap();
    assert_eq!(view.kpis.headcount, 0);
    assert_eq!(view.kpis.attrition_rate, 0.0);
    assert_eq!(view.kpis.average_monthly_income, 0);
    assert!(view.performance_vs_attrition.is_empty());
    assert!(view.employees.is_empty());
}

#[tokio::test]
async fn form_options_suggest_the_next_id() {
    let hr = seeded_module().await;
    let options = hr.form_options().await.unwrap();
    assert_eq!(options.next_employee_id, 8);
    assert!(options.job_roles.contains(&"Research Scientist".to_string()));
}

#[tokio::test]
async fn added_employees_start_without_attrition() {
    let hr = seeded_module().await;
    hr.add_employee(&hire(8)).await.unwrap();

    let snapshot = hr.snapshot().await.unwrap();
    let added = snapshot.iter().find(|e| e.employee_id == 8).unwrap();
    assert_eq!(
        added,
        &EmployeeRecord {
            employee_id: 8,
            department: "Sales".into(),
            job_role: Some("Sales Representative".into()),
            performance_rating: Some(3),
            over_time: Some(YesNo::No),
            monthly_income: Some(2500),
            attrition: Some(YesNo::No),
        }
    );
}

#[tokio::test]
async fn duplicate_ids_are_rejected_without_touching_the_table() {
    let hr = seeded_module().await;
    let before = hr.snapshot().await.unwrap();

    let result = hr.add_employee(&hire(4)).await;
    assert!(matches!(result, Err(HrError::DuplicateEmployee(4))));
    assert_eq!(
        Notice::from_result(&result, "added"),
        Notice::Error("Employee ID 4 already exists".into())
    );
    assert_eq!(hr.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn invalid_forms_never_reach_the_store() {
    let hr = seeded_module().await;
    let before = hr.snapshot().await.unwrap();
    let low_income = NewEmployee {
        monthly_income: 999,
        ..hire(9)
    };
    assert!(matches!(
        hr.add_employee(&low_income).await,
        Err(HrError::Validation(_))
    ));
    assert!(matches!(
        hr.update_income(1, 500).await,
        Err(HrError::Validation(_))
    ));
    assert_eq!(hr.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn income_update_changes_only_the_target_row() {
    let hr = seeded_module().await;
    let before = hr.snapshot().await.unwrap();

    hr.update_income(4, 2600).await.unwrap();

    let after = hr.snapshot().await.unwrap();
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        if old.employee_id == 4 {
            assert_eq!(new.monthly_income, Some(2600));
            assert_eq!(
                &EmployeeRecord {
                    monthly_income: old.monthly_income,
                    ..new.clone()
                },
                old
            );
        } else {
            assert_eq!(old, new);
        }
    }
}

#[tokio::test]
async fn updating_an_unknown_employee_is_reported() {
    let hr = seeded_module().await;
    assert!(matches!(
        hr.update_income(404, 5000).await,
        Err(HrError::UnknownEmployee(404))
    ));
}

#[tokio::test]
async fn sidebar_lists_all_first() {
    let hr = seeded_module().await;
    assert_eq!(
        hr.departments().await.unwrap(),
        vec!["All", "Human Resources", "Research & Development", "Sales"]
    );
}

#[tokio::test]
async fn free_ids_below_the_maximum_are_refused() {
    let hr = seeded_module().await;
    let before = hr.snapshot().await.unwrap();

    let result = hr.add_employee(&hire(3)).await;
    assert!(matches!(result, Err(HrError::Validation(_))));
    assert_eq!(
        Notice::from_result(&result, "added"),
        Notice::Error("Employee ID must be greater than the current maximum (7)".into())
    );
    assert_eq!(hr.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn largest_possible_id_cannot_exhaust_suggestions() {
    let hr = seeded_module().await;
    assert!(matches!(
        hr.add_employee(&hire(i64::MAX)).await,
        Err(HrError::Validation(_))
    ));
    assert_eq!(hr.form_options().await.unwrap().next_employee_id, 8);

    hr.store()
        .execute(
            r#"INSERT INTO employees ("EmployeeID", "Department") VALUES (?, 'Sales')"#,
            vec![i64::MAX.into()],
        )
        .await
        .unwrap();
    assert!(matches!(
        hr.form_options().await,
        Err(HrError::Validation(_))
    ));
}
