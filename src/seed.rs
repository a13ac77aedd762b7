//! Curriculum fixtures: the 12-week course plan, sample lessons for the
//! first weeks, one demo student with some progress, two challenges and the
//! achievement catalog. Meant for an empty store; ids are assigned in
//! insertion order.

use crate::schema::{
    NewAchievement, NewChallenge, NewCourse, NewLesson, NewProgress, NewStudent,
};
use crate::storage::{StoreError, Storage};
use log::info;

pub async fn load<S: Storage>(store: &S) -> Result<(), StoreError> {
    let alex = store
        .create_student(NewStudent {
            name: "Alex Kim".to_string(),
            username: "alex_kim".to_string(),
            current_week: Some(3),
            total_points: Some(1250),
            streak_days: Some(7),
            level: Some(3),
            achievements: Some(vec![
                "first_steps".to_string(),
                "variable_master".to_string(),
                "decision_maker".to_string(),
            ]),
        })
        .await?;

    let courses: [(&str, &str, i64, i64, bool); 12] = [
        ("Hello Python!", "Basic syntax & your first program", 1, 5, false),
        ("Data Types", "Numbers, strings & variables", 2, 4, false),
        ("Conditions", "If statements & decision making", 3, 5, false),
        ("Loops", "Repeating actions with for & while", 4, 6, true),
        ("Functions", "Creating reusable code blocks", 5, 5, true),
        ("Lists", "Storing multiple items together", 6, 4, true),
        ("Dictionaries", "Key-value data storage", 7, 4, true),
        ("File Handling", "Reading and writing files", 8, 3, true),
        ("Error Handling", "Dealing with mistakes gracefully", 9, 3, true),
        ("Libraries", "Using other people's code", 10, 4, true),
        ("Project Time", "Building your own programs", 11, 3, true),
        ("Showcase", "Share your creations!", 12, 2, true),
    ];
    let mut course_ids = vec![];
    for (title, description, week_number, total_lessons, is_locked) in courses {
        let course = store
            .create_course(NewCourse {
                title: title.to_string(),
                description: description.to_string(),
                week_number,
                total_lessons,
                is_locked: Some(is_locked),
            })
            .await?;
        course_ids.push(course.id);
    }

    // (course index, title, description, content, sample code, expected output, lesson number, points)
    let lessons: [(usize, &str, &str, &str, &str, &str, i64, i64); 16] = [
        (0, "What is Python?", "Introduction to programming",
         "Python is a friendly programming language that helps us talk to computers!",
         "print(\"Hello, World!\")", "Hello, World!", 1, 50),
        (0, "Your First Program", "Writing your first Python code",
         "Let's write our very first Python program together!",
         "print(\"I am learning Python!\")", "I am learning Python!", 2, 50),
        (0, "Print Commands", "Making Python talk to us",
         "The print() function is how we make Python show us messages!",
         "print(\"Python is awesome!\")\nprint(\"I love coding!\")",
         "Python is awesome!\nI love coding!", 3, 50),
        (1, "Numbers in Python", "Working with numbers",
         "Python can work with whole numbers (integers) and decimal numbers (floats)!",
         "age = 10\nheight = 4.5\nprint(\"Age:\", age)\nprint(\"Height:\", height)",
         "Age: 10\nHeight: 4.5", 1, 50),
        (1, "Text and Strings", "Working with words",
         "Strings are how we store text in Python. Always put text in quotes!",
         "name = \"Alex\"\nfavorite_color = \"blue\"\nprint(\"My name is\", name)\nprint(\"My favorite color is\", favorite_color)",
         "My name is Alex\nMy favorite color is blue", 2, 50),
        (2, "True or False", "Understanding boolean values",
         "In Python, things can be either True or False. This helps us make decisions!",
         "is_sunny = True\nis_raining = False\nprint(\"Is it sunny?\", is_sunny)\nprint(\"Is it raining?\", is_raining)",
         "Is it sunny? True\nIs it raining? False", 1, 50),
        (2, "If Statements", "Making decisions in code",
         "If statements let us tell Python to do different things based on conditions!",
         "age = 10\nif age >= 8:\n    print(\"You can ride the roller coaster!\")\nelse:\n    print(\"You need to grow a bit more!\")",
         "You can ride the roller coaster!", 2, 75),
        (2, "Comparing Things", "Using comparison operators",
         "Python can compare numbers and text using special symbols like ==, >, <, >=, <=",
         "score = 85\nif score >= 90:\n    print(\"Excellent!\")\nelif score >= 80:\n    print(\"Great job!\")\nelse:\n    print(\"Keep practicing!\")",
         "Great job!", 3, 75),
        (2, "Multiple Conditions", "Using and, or operators",
         "Sometimes we need to check multiple things at once using 'and' and 'or'!",
         "weather = \"sunny\"\ntemperature = 75\n\nif weather == \"sunny\" and temperature > 70:\n    print(\"Perfect day for the park!\")\nelse:\n    print(\"Maybe stay inside today\")",
         "Perfect day for the park!", 4, 100),
        (2, "Decision Making Practice", "Putting it all together",
         "Let's practice making complex decisions with if statements!",
         "favorite_food = \"pizza\"\nhungry = True\n\nif hungry and favorite_food == \"pizza\":\n    print(\"Let's order pizza!\")\nelif hungry:\n    print(\"Let's find something to eat\")\nelse:\n    print(\"I'm not hungry right now\")",
         "Let's order pizza!", 5, 100),
        (3, "What are Loops?", "Introduction to repetition",
         "Loops help us repeat actions without writing the same code over and over!",
         "for i in range(5):\n    print(\"Python is fun!\")",
         "Python is fun!\nPython is fun!\nPython is fun!\nPython is fun!\nPython is fun!", 1, 75),
        (3, "Counting with For Loops", "Using for loops to count",
         "For loops are great for counting and doing something a specific number of times!",
         "for number in range(1, 6):\n    print(\"Count:\", number)",
         "Count: 1\nCount: 2\nCount: 3\nCount: 4\nCount: 5", 2, 75),
        (3, "While Loops", "Loops that keep going while something is true",
         "While loops continue as long as a condition stays true!",
         "countdown = 5\nwhile countdown > 0:\n    print(\"Countdown:\", countdown)\n    countdown = countdown - 1\nprint(\"Blast off!\")",
         "Countdown: 5\nCountdown: 4\nCountdown: 3\nCountdown: 2\nCountdown: 1\nBlast off!", 3, 100),
        (4, "What is a Function?", "Naming a block of code",
         "Functions let us give a name to a few lines of code and reuse them anywhere!",
         "def greet():\n    print(\"Hello there!\")\n\ngreet()", "Hello there!", 1, 75),
        (4, "Function Inputs", "Passing values into functions",
         "Functions become much more useful when we hand them values to work with!",
         "def greet(name):\n    print(\"Hello,\", name)\n\ngreet(\"Alex\")", "Hello, Alex", 2, 75),
        (4, "Returning Values", "Getting answers back",
         "A function can hand a result back to us with the return keyword!",
         "def double(number):\n    return number * 2\n\nprint(double(4))", "8", 3, 100),
    ];
    let mut lesson_ids = vec![];
    for (course_idx, title, description, content, sample_code, expected_output, lesson_number, points) in
        lessons
    {
        let lesson = store
            .create_lesson(NewLesson {
                course_id: course_ids[course_idx],
                title: title.to_string(),
                description: description.to_string(),
                content: content.to_string(),
                sample_code: Some(sample_code.to_string()),
                expected_output: Some(expected_output.to_string()),
                lesson_number,
                points: Some(points),
            })
            .await?;
        lesson_ids.push(lesson.id);
    }

    // (course index, lesson index, completed, submitted code)
    let progress: [(usize, usize, bool, Option<&str>); 4] = [
        (0, 0, true, Some("print(\"Hello, World!\")")),
        (0, 1, true, Some("print(\"I am learning Python!\")")),
        (1, 3, true, Some("age = 10\nprint(\"Age:\", age)")),
        (2, 5, false, None),
    ];
    for (course_idx, lesson_idx, completed, code) in progress {
        store
            .create_progress(NewProgress {
                student_id: alex.id,
                course_id: course_ids[course_idx],
                lesson_id: Some(lesson_ids[lesson_idx]),
                completed: Some(completed),
                code_submitted: code.map(|c| c.to_string()),
            })
            .await?;
    }

    store
        .create_challenge(NewChallenge {
            title: "Age Group Classifier".to_string(),
            description:
                "Write a program that tells someone if they're a kid, teen, or adult based on their age!"
                    .to_string(),
            difficulty: "Easy".to_string(),
            points: 150,
            sample_code: Some("age = int(input(\"How old are you? \"))\n# Your code here".to_string()),
            solution: Some(
                "age = int(input(\"How old are you? \"))\nif age < 13:\n    print(\"You are a kid!\")\nelif age < 20:\n    print(\"You are a teen!\")\nelse:\n    print(\"You are an adult!\")"
                    .to_string(),
            ),
            is_daily: Some(true),
        })
        .await?;
    store
        .create_challenge(NewChallenge {
            title: "Number Guesser".to_string(),
            description: "Create a simple guessing game!".to_string(),
            difficulty: "Medium".to_string(),
            points: 200,
            sample_code: Some("secret_number = 7\n# Your code here".to_string()),
            solution: Some(
                "secret_number = 7\nguess = int(input(\"Guess a number: \"))\nif guess == secret_number:\n    print(\"Correct!\")\nelse:\n    print(\"Try again!\")"
                    .to_string(),
            ),
            is_daily: Some(false),
        })
        .await?;

    let achievements: [(&str, &str, &str, i64, &str); 6] = [
        ("First Steps", "Completed your first lesson", "fas fa-rocket", 50, "complete_first_lesson"),
        ("Variable Master", "Created 10 variables", "fas fa-database", 100, "create_10_variables"),
        ("Decision Maker", "Used 5 if statements", "fas fa-question-circle", 75, "use_5_if_statements"),
        ("Loop Hero", "Create your first loop", "fas fa-sync", 100, "create_first_loop"),
        ("Problem Solver", "Solve 10 challenges", "fas fa-puzzle-piece", 200, "solve_10_challenges"),
        ("Python Expert", "Complete the course", "fas fa-star", 500, "complete_course"),
    ];
    for (name, description, icon, points, condition) in achievements {
        store
            .create_achievement(NewAchievement {
                name: name.to_string(),
                description: description.to_string(),
                icon: icon.to_string(),
                points,
                condition: condition.to_string(),
            })
            .await?;
    }

    info!("seeded curriculum fixtures");
    Ok(())
}
