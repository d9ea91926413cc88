use docket::common::SortOrder;
use docket::filter::{and, field, not, or};
use docket::repository::Repository;
use futures::TryStreamExt;

use crate::repository::{employee_with_age, generate_employee, Employee, EmployeeName};
use docket_int_test::test_util::{run_test, TestContext};

async fn seeded(ctx: &TestContext) -> docket::errors::DocketResult<Repository<Employee>> {
    let repo: Repository<Employee> = ctx.repository().await?;
    let employees = vec![
        Employee {
            name: "Ada".to_string(),
            tags: vec!["engineering".to_string(), "lead".to_string()],
            ..employee_with_age(1, 36)
        },
        Employee {
            name: "Grace".to_string(),
            tags: vec!["engineering".to_string()],
            ..employee_with_age(2, 45)
        },
        Employee {
            name: "Linus".to_string(),
            tags: vec!["support".to_string()],
            ..employee_with_age(3, 28)
        },
        Employee {
            name: "Barbara".to_string(),
            tags: vec![],
            address: None,
            ..employee_with_age(4, 52)
        },
    ];
    repo.add_many(employees).await?;
    Ok(repo)
}

fn ids(employees: &[Employee]) -> Vec<i64> {
    employees.iter().filter_map(|e| e.emp_id).collect()
}

#[tokio::test]
async fn test_stream_enumerates_everything() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;
        let mut all: Vec<Employee> = repo.stream().try_collect().await?;
        all.sort_by_key(|e| e.emp_id);
        assert_eq!(ids(&all), vec![1, 2, 3, 4]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_query_is_restartable() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;
        let query = repo.query().sort_by("age", SortOrder::Ascending);

        let first = query.to_vec().await?;
        let second = query.to_vec().await?;
        assert_eq!(first, second);

        // a later write is seen by the next enumeration
        repo.add(employee_with_age(5, 19)).await?;
        let third = query.to_vec().await?;
        assert_eq!(ids(&third), vec![5, 3, 1, 2, 4]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_comparison_filters() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;

        let older = repo
            .query()
            .filter(field("age").gt(40))
            .sort_by("_id", SortOrder::Ascending)
            .to_vec()
            .await?;
        assert_eq!(ids(&older), vec![2, 4]);

        let range = repo
            .query()
            .filter(field("age").between(28, 45))
            .sort_by("age", SortOrder::Descending)
            .to_vec()
            .await?;
        assert_eq!(ids(&range), vec![2, 1, 3]);

        let young: Vec<Employee> = repo.find(field("age").lt(30)).try_collect().await?;
        assert_eq!(ids(&young), vec![3]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_logical_filters() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;

        let filter = or(vec![
            field("name").eq("Ada"),
            and(vec![field("age").gte(45), not(field("name").eq("Barbara"))]),
        ]);
        let found = repo
            .query()
            .filter(filter)
            .sort_by("_id", SortOrder::Ascending)
            .to_vec()
            .await?;
        assert_eq!(ids(&found), vec![1, 2]);

        let chained = repo
            .query()
            .filter(field("age").gt(30))
            .filter(field("age").lt(50))
            .sort_by("_id", SortOrder::Ascending)
            .to_vec()
            .await?;
        assert_eq!(ids(&chained), vec![1, 2]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_array_and_embedded_fields() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;

        let engineers = repo
            .query()
            .filter(field("tags").eq("engineering"))
            .sort_by("_id", SortOrder::Ascending)
            .to_vec()
            .await?;
        assert_eq!(ids(&engineers), vec![1, 2]);

        let tagged = repo
            .query()
            .filter(field("tags").in_array(vec!["lead", "support"]))
            .sort_by("_id", SortOrder::Ascending)
            .to_vec()
            .await?;
        assert_eq!(ids(&tagged), vec![1, 3]);

        let homeless = repo
            .query()
            .filter(field("address.city").exists(false))
            .to_vec()
            .await?;
        assert_eq!(ids(&homeless), vec![4]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_regex_filter() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;
        let found = repo
            .query()
            .filter(field("name").regex("^(Ada|Grace)$"))
            .sort_by("name", SortOrder::Descending)
            .to_vec()
            .await?;
        assert_eq!(ids(&found), vec![2, 1]);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_skip_limit_and_first() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;
        let by_age = repo.query().sort_by("age", SortOrder::Ascending);

        let page = by_age.clone().skip(1).limit(2).to_vec().await?;
        assert_eq!(ids(&page), vec![1, 2]);

        let youngest = by_age.first().await?.expect("collection is not empty");
        assert_eq!(youngest.emp_id, Some(3));

        let nothing = by_age.clone().limit(0).to_vec().await?;
        assert!(nothing.is_empty());

        let past_the_end = by_age.clone().skip(10).first().await?;
        assert!(past_the_end.is_none());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_query_count_and_exists() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;

        let over_thirty = repo.query().filter(field("age").gt(30));
        assert_eq!(over_thirty.count().await?, 3);
        assert_eq!(over_thirty.clone().skip(1).count().await?, 2);
        assert_eq!(over_thirty.clone().limit(1).count().await?, 1);
        assert!(over_thirty.exists().await?);

        let nobody = repo.query().filter(field("age").gt(100));
        assert_eq!(nobody.count().await?, 0);
        assert!(!nobody.exists().await?);

        assert!(repo.exists(field("name").eq("Linus")).await?);
        assert!(!repo.exists(field("name").eq("Dennis")).await?);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_projection() {
    run_test(|ctx| async move {
        let repo = seeded(&ctx).await?;
        let names: Vec<EmployeeName> = repo
            .query()
            .filter(field("age").lt(40))
            .sort_by("_id", SortOrder::Ascending)
            .project::<EmployeeName>(&["name"])
            .try_collect()
            .await?;

        assert_eq!(
            names,
            vec![
                EmployeeName {
                    emp_id: 1,
                    name: "Ada".to_string(),
                    age: None
                },
                EmployeeName {
                    emp_id: 3,
                    name: "Linus".to_string(),
                    age: None
                },
            ]
        );
        Ok(())
    })
    .await
}

#[tokio::test]
async fn test_query_reports_element_type() {
    run_test(|ctx| async move {
        let repo: Repository<Employee> = ctx.repository().await?;
        assert!(repo.query().element_type().ends_with("Employee"));

        repo.add(generate_employee(1)).await?;
        let first = repo.stream().first().await?;
        assert_eq!(first.and_then(|e| e.emp_id), Some(1));
        Ok(())
    })
    .await
}
